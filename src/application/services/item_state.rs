//! Live view of one item's thumbnails across qualities.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::domain::entities::{MediaItemId, ThumbnailImage, ThumbnailKey, ThumbnailQuality};
use crate::domain::errors::ThumbnailError;
use crate::domain::ports::{ThumbnailLoadListener, ThumbnailProvider};
use crate::infrastructure::image::{ListenerId, ThumbnailLoader};

/// Which qualities of an item are loaded and which are loading.
#[derive(Debug, Clone, Default)]
pub struct ItemThumbnailState {
    loaded: HashMap<ThumbnailQuality, Weak<ThumbnailImage>>,
    loading: Vec<ThumbnailQuality>,
}

impl ItemThumbnailState {
    /// Builds the state from what the loader currently holds.
    #[must_use]
    pub fn snapshot(
        loader: &ThumbnailLoader,
        item: &MediaItemId,
        provider: &dyn ThumbnailProvider,
    ) -> Self {
        let mut state = Self::default();
        state.merge_from(loader, item, provider);
        state
    }

    /// Weak handles of the loaded qualities.
    #[must_use]
    pub fn loaded(&self) -> &HashMap<ThumbnailQuality, Weak<ThumbnailImage>> {
        &self.loaded
    }

    /// Qualities with a fetch in flight.
    #[must_use]
    pub fn loading(&self) -> &[ThumbnailQuality] {
        &self.loading
    }

    /// Returns true if `quality` is being fetched.
    #[must_use]
    pub fn is_loading(&self, quality: ThumbnailQuality) -> bool {
        self.loading.contains(&quality)
    }

    /// Highest quality image that is still alive.
    #[must_use]
    pub fn highest_quality(&self) -> Option<Arc<ThumbnailImage>> {
        ThumbnailQuality::ALL
            .iter()
            .rev()
            .find_map(|quality| self.loaded.get(quality).and_then(Weak::upgrade))
    }

    fn merge_from(
        &mut self,
        loader: &ThumbnailLoader,
        item: &MediaItemId,
        provider: &dyn ThumbnailProvider,
    ) {
        let provider_id = provider.provider_id();
        for quality in ThumbnailQuality::ALL {
            let key = ThumbnailKey::new(provider_id.clone(), quality, item.clone());
            if let Some(image) = loader.get_loaded_thumbnail(&key) {
                self.loaded.insert(quality, Arc::downgrade(&image));
            }
            if loader.is_loading(&key) {
                self.mark_loading(quality);
            }
        }
    }

    fn mark_loading(&mut self, quality: ThumbnailQuality) {
        if !self.loading.contains(&quality) {
            self.loading.push(quality);
        }
    }

    fn clear_loading(&mut self, quality: ThumbnailQuality) {
        self.loading.retain(|q| *q != quality);
    }
}

struct ItemStateListener {
    item: MediaItemId,
    state: Arc<Mutex<ItemThumbnailState>>,
}

impl ThumbnailLoadListener for ItemStateListener {
    fn on_load_started(&self, key: &ThumbnailKey) {
        if key.item_id != self.item {
            return;
        }
        self.state.lock().mark_loading(key.quality);
    }

    fn on_load_finished(&self, key: &ThumbnailKey, image: &Arc<ThumbnailImage>) {
        if key.item_id != self.item {
            return;
        }
        let mut state = self.state.lock();
        state.clear_loading(key.quality);
        state.loaded.insert(key.quality, Arc::downgrade(image));
    }

    fn on_load_failed(&self, key: &ThumbnailKey, _error: &ThumbnailError) {
        if key.item_id != self.item {
            return;
        }
        self.state.lock().clear_loading(key.quality);
    }
}

/// Keeps an [`ItemThumbnailState`] current by listening to the loader.
/// Unregisters itself on drop.
pub struct ItemStateObserver {
    loader: ThumbnailLoader,
    listener_id: ListenerId,
    state: Arc<Mutex<ItemThumbnailState>>,
}

impl ItemStateObserver {
    /// Starts observing `item`.
    #[must_use]
    pub fn attach(
        loader: &ThumbnailLoader,
        item: MediaItemId,
        provider: &dyn ThumbnailProvider,
    ) -> Self {
        let state = Arc::new(Mutex::new(ItemThumbnailState::default()));

        // Listen first, then snapshot under the state lock: events that race
        // with the snapshot are applied after it.
        let mut guard = state.lock();
        let listener_id = loader.add_listener(Arc::new(ItemStateListener {
            item: item.clone(),
            state: Arc::clone(&state),
        }));
        guard.merge_from(loader, &item, provider);
        drop(guard);

        Self {
            loader: loader.clone(),
            listener_id,
            state,
        }
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn state(&self) -> ItemThumbnailState {
        self.state.lock().clone()
    }

    /// Highest quality image that is still alive.
    #[must_use]
    pub fn highest_quality(&self) -> Option<Arc<ThumbnailImage>> {
        self.state.lock().highest_quality()
    }
}

impl Drop for ItemStateObserver {
    fn drop(&mut self) {
        self.loader.remove_listener(self.listener_id);
    }
}
