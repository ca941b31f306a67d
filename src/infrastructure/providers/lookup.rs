//! In-memory provider lookup.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::entities::MediaItemId;
use crate::domain::ports::{ThumbnailProvider, ThumbnailProviderLookup};

/// Maps item ids to their providers.
#[derive(Default)]
pub struct InMemoryProviderLookup {
    providers: RwLock<HashMap<MediaItemId, Arc<dyn ThumbnailProvider>>>,
}

impl InMemoryProviderLookup {
    /// Creates an empty lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the provider for an item.
    pub fn insert(&self, item: MediaItemId, provider: Arc<dyn ThumbnailProvider>) {
        self.providers.write().insert(item, provider);
    }

    /// Forgets the provider for an item.
    pub fn remove(&self, item: &MediaItemId) -> bool {
        self.providers.write().remove(item).is_some()
    }

    /// Number of registered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    /// Returns true if no items are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ThumbnailProviderLookup for InMemoryProviderLookup {
    async fn thumbnail_provider(&self, item: &MediaItemId) -> Option<Arc<dyn ThumbnailProvider>> {
        self.providers.read().get(item).cloned()
    }
}
