//! Provider backed by a fixed list of thumbnail variants.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{ProviderId, ThumbnailQuality};
use crate::domain::ports::ThumbnailProvider;

/// One concrete thumbnail variant as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailVariant {
    /// Image URL.
    pub url: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ThumbnailVariant {
    /// Creates a new variant.
    #[must_use]
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            url: url.into(),
            width,
            height,
        }
    }

    const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Picks variants by size: `Low` is the smallest, `High` the largest and
/// `Medium` the median.
#[derive(Debug, Clone)]
pub struct ThumbnailSet {
    /// Sorted by area, smallest first.
    variants: Vec<ThumbnailVariant>,
    id: ProviderId,
}

impl ThumbnailSet {
    /// Creates a set from the given variants in any order.
    #[must_use]
    pub fn new(mut variants: Vec<ThumbnailVariant>) -> Self {
        variants.sort_by_key(ThumbnailVariant::area);
        let id = ProviderId::from_parts(variants.iter().map(|v| v.url.as_str()));
        Self { variants, id }
    }

    /// Creates a set from bare URLs, ordered smallest first. Sizes are unknown
    /// so the given order is kept.
    #[must_use]
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variants = urls
            .into_iter()
            .zip(1u32..)
            .map(|(url, rank)| ThumbnailVariant::new(url, rank, rank))
            .collect();
        Self::new(variants)
    }

    /// Returns the variants, smallest first.
    #[must_use]
    pub fn variants(&self) -> &[ThumbnailVariant] {
        &self.variants
    }

    /// Returns the variant chosen for `quality`.
    #[must_use]
    pub fn variant(&self, quality: ThumbnailQuality) -> Option<&ThumbnailVariant> {
        match quality {
            ThumbnailQuality::Low => self.variants.first(),
            ThumbnailQuality::Medium => self.variants.get(self.variants.len() / 2),
            ThumbnailQuality::High => self.variants.last(),
        }
    }
}

impl ThumbnailProvider for ThumbnailSet {
    fn provider_id(&self) -> ProviderId {
        self.id.clone()
    }

    fn thumbnail_url(&self, quality: ThumbnailQuality) -> Option<String> {
        self.variant(quality).map(|v| v.url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> ThumbnailSet {
        ThumbnailSet::new(vec![
            ThumbnailVariant::new("http://x/large.jpg", 544, 544),
            ThumbnailVariant::new("http://x/small.jpg", 60, 60),
            ThumbnailVariant::new("http://x/mid.jpg", 226, 226),
        ])
    }

    #[test]
    fn test_quality_selection() {
        let set = sample_set();

        assert_eq!(
            set.thumbnail_url(ThumbnailQuality::Low).as_deref(),
            Some("http://x/small.jpg")
        );
        assert_eq!(
            set.thumbnail_url(ThumbnailQuality::Medium).as_deref(),
            Some("http://x/mid.jpg")
        );
        assert_eq!(
            set.thumbnail_url(ThumbnailQuality::High).as_deref(),
            Some("http://x/large.jpg")
        );
    }

    #[test]
    fn test_empty_set_has_no_urls() {
        let set = ThumbnailSet::new(Vec::new());
        for quality in ThumbnailQuality::ALL {
            assert_eq!(set.thumbnail_url(quality), None);
        }
    }

    #[test]
    fn test_single_url_serves_every_quality() {
        let set = ThumbnailSet::from_urls(["http://x/thumb.png"]);
        for quality in ThumbnailQuality::ALL {
            assert_eq!(
                set.thumbnail_url(quality).as_deref(),
                Some("http://x/thumb.png")
            );
        }
    }

    #[test]
    fn test_provider_id_ignores_input_order() {
        let reordered = ThumbnailSet::new(vec![
            ThumbnailVariant::new("http://x/small.jpg", 60, 60),
            ThumbnailVariant::new("http://x/mid.jpg", 226, 226),
            ThumbnailVariant::new("http://x/large.jpg", 544, 544),
        ]);
        assert_eq!(sample_set().provider_id(), reordered.provider_id());
    }
}
