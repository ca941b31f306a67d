//! Domain types for thumbnail identity and quality.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Decoded thumbnail image handed out by the loader.
pub type ThumbnailImage = image::DynamicImage;

/// Identity of a media item (song, artist, playlist).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaItemId(String);

impl MediaItemId {
    /// Creates a new `MediaItemId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MediaItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MediaItemId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Resolution tier of a thumbnail. Ordering follows resolution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailQuality {
    /// Smallest variant, used in dense lists.
    #[default]
    Low,
    /// Mid-sized variant.
    Medium,
    /// Largest variant, used for now-playing artwork.
    High,
}

impl ThumbnailQuality {
    /// Every tier, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Position of the tier in [`Self::ALL`]. Part of the disk cache file name.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    /// Lowercase name used by the CLI and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ThumbnailQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThumbnailQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown thumbnail quality: {other}")),
        }
    }
}

/// Identity of a thumbnail provider.
///
/// Derived from the provider's content, so two providers that resolve the
/// same URLs share cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderId(String);

impl ProviderId {
    /// Creates a new `ProviderId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a `ProviderId` by hashing the given parts in order.
    #[must_use]
    pub fn from_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        let result = hasher.finalize();
        Self(hex::encode(&result[..16]))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of one cacheable thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbnailKey {
    /// Provider that resolves the URL.
    pub provider: ProviderId,
    /// Requested tier.
    pub quality: ThumbnailQuality,
    /// Item the thumbnail belongs to.
    pub item_id: MediaItemId,
}

impl ThumbnailKey {
    /// Creates a new key.
    #[must_use]
    pub fn new(provider: ProviderId, quality: ThumbnailQuality, item_id: MediaItemId) -> Self {
        Self {
            provider,
            quality,
            item_id,
        }
    }
}

impl fmt::Display for ThumbnailKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}", self.item_id, self.quality, self.provider)
    }
}

/// Where a loaded thumbnail came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailSource {
    /// Served from a live weak slot.
    Memory,
    /// Decoded from the on-disk cache.
    Disk,
    /// Downloaded from the provider URL.
    Network,
}

impl fmt::Display for ThumbnailSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Disk => write!(f, "disk"),
            Self::Network => write!(f, "network"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_case::test_case;

    #[test_case(ThumbnailQuality::Low, 0 ; "low")]
    #[test_case(ThumbnailQuality::Medium, 1 ; "medium")]
    #[test_case(ThumbnailQuality::High, 2 ; "high")]
    fn test_quality_ordinal(quality: ThumbnailQuality, expected: u8) {
        assert_eq!(quality.ordinal(), expected);
        assert_eq!(ThumbnailQuality::ALL[expected as usize], quality);
    }

    #[test]
    fn test_quality_ordering() {
        assert!(ThumbnailQuality::Low < ThumbnailQuality::Medium);
        assert!(ThumbnailQuality::Medium < ThumbnailQuality::High);
        assert_eq!(
            ThumbnailQuality::ALL.iter().max(),
            Some(&ThumbnailQuality::High)
        );
    }

    #[test_case("low", Ok(ThumbnailQuality::Low) ; "lowercase")]
    #[test_case("HIGH", Ok(ThumbnailQuality::High) ; "uppercase")]
    #[test_case("ultra", Err(()) ; "unknown")]
    fn test_quality_from_str(input: &str, expected: Result<ThumbnailQuality, ()>) {
        assert_eq!(input.parse::<ThumbnailQuality>().map_err(|_| ()), expected);
    }

    #[test]
    fn test_provider_id_is_content_derived() {
        let a = ProviderId::from_parts(["http://x/a.png", "http://x/b.png"]);
        let b = ProviderId::from_parts(["http://x/a.png", "http://x/b.png"]);
        let c = ProviderId::from_parts(["http://x/a.pngh", "ttp://x/b.png"]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn test_key_equality_is_structural() {
        let provider = ProviderId::new("p");
        let k1 = ThumbnailKey::new(provider.clone(), ThumbnailQuality::Low, "abc".into());
        let k2 = ThumbnailKey::new(provider.clone(), ThumbnailQuality::Low, "abc".into());
        let k3 = ThumbnailKey::new(provider.clone(), ThumbnailQuality::High, "abc".into());
        let k4 = ThumbnailKey::new(ProviderId::new("q"), ThumbnailQuality::Low, "abc".into());

        let set: HashSet<_> = [k1.clone(), k2, k3, k4].into_iter().collect();
        assert_eq!(set.len(), 3);
        assert!(set.contains(&k1));
    }
}
