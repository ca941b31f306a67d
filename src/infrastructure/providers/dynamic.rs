//! Provider that builds URLs from a size template.

use crate::domain::entities::{ProviderId, ThumbnailQuality};
use crate::domain::ports::ThumbnailProvider;

/// Placeholder replaced with the target pixel size.
pub const SIZE_PLACEHOLDER: &str = "{size}";

/// Resizing image CDNs take the wanted size in the URL, so every quality is
/// available from one template.
#[derive(Debug, Clone)]
pub struct DynamicThumbnailProvider {
    template: String,
    id: ProviderId,
}

impl DynamicThumbnailProvider {
    /// Creates a provider from a template containing [`SIZE_PLACEHOLDER`].
    /// Returns `None` if the placeholder is missing.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Option<Self> {
        let template = template.into();
        if !template.contains(SIZE_PLACEHOLDER) {
            return None;
        }
        let id = ProviderId::from_parts([template.as_str()]);
        Some(Self { template, id })
    }

    /// Target edge length in pixels for `quality`.
    #[must_use]
    pub const fn size_for(quality: ThumbnailQuality) -> u32 {
        match quality {
            ThumbnailQuality::Low => 180,
            ThumbnailQuality::Medium => 360,
            ThumbnailQuality::High => 720,
        }
    }
}

impl ThumbnailProvider for DynamicThumbnailProvider {
    fn provider_id(&self) -> ProviderId {
        self.id.clone()
    }

    fn thumbnail_url(&self, quality: ThumbnailQuality) -> Option<String> {
        Some(
            self.template
                .replace(SIZE_PLACEHOLDER, &Self::size_for(quality).to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_expansion() {
        let provider =
            DynamicThumbnailProvider::new("https://img.example/abc=w{size}-h{size}").unwrap();

        assert_eq!(
            provider.thumbnail_url(ThumbnailQuality::Low).as_deref(),
            Some("https://img.example/abc=w180-h180")
        );
        assert_eq!(
            provider.thumbnail_url(ThumbnailQuality::High).as_deref(),
            Some("https://img.example/abc=w720-h720")
        );
    }

    #[test]
    fn test_missing_placeholder_is_rejected() {
        assert!(DynamicThumbnailProvider::new("https://img.example/abc.jpg").is_none());
    }
}
