//! Thumbnail provider port definitions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::{MediaItemId, ProviderId, ThumbnailQuality};

/// Resolves thumbnail URLs for one item.
#[cfg_attr(test, mockall::automock)]
pub trait ThumbnailProvider: Send + Sync {
    /// Stable identity of this provider, part of the cache key.
    fn provider_id(&self) -> ProviderId;

    /// Returns the URL for the given tier, or `None` if the provider has none.
    fn thumbnail_url(&self, quality: ThumbnailQuality) -> Option<String>;
}

/// Finds the thumbnail provider stored for an item.
#[async_trait]
pub trait ThumbnailProviderLookup: Send + Sync {
    /// Returns the item's provider, if one is known.
    async fn thumbnail_provider(&self, item: &MediaItemId) -> Option<Arc<dyn ThumbnailProvider>>;
}
