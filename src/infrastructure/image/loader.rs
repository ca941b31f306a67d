//! Deduplicating thumbnail loader.
//!
//! Lookup order: weak memory slot -> in-flight load -> disk -> network.
//! Every key has at most one fetch running; late callers join it through a
//! shared future and receive the same outcome.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use bytes::Bytes;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::domain::entities::{
    LoadState, MediaItemId, ThumbnailImage, ThumbnailKey, ThumbnailQuality, ThumbnailSource,
};
use crate::domain::errors::{ThumbnailError, ThumbnailResult};
use crate::domain::ports::{
    ImageDownloadPort, ThumbnailLoadListener, ThumbnailProvider, ThumbnailProviderLookup,
};

use super::codec;
use super::disk_cache::ThumbnailDiskCache;
use super::listeners::{ListenerId, ListenerRegistry};

/// Per-call cache switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Skip the disk cache lookup and go to the network.
    pub disable_cache_read: bool,
    /// Do not write the disk file and do not fill the memory slot.
    pub disable_cache_write: bool,
}

/// A loaded thumbnail and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedThumbnail {
    /// The decoded image.
    pub image: Arc<ThumbnailImage>,
    /// Where the image was served from.
    pub source: ThumbnailSource,
}

/// Configuration for the thumbnail loader.
#[derive(Debug, Clone)]
pub struct ThumbnailLoaderConfig {
    /// Write successful downloads to the disk cache.
    pub disk_cache_enabled: bool,
}

impl Default for ThumbnailLoaderConfig {
    fn default() -> Self {
        Self {
            disk_cache_enabled: true,
        }
    }
}

type SharedFetch = Shared<BoxFuture<'static, ThumbnailResult<LoadedThumbnail>>>;

struct InFlightLoad {
    generation: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct Slots {
    loaded: HashMap<ThumbnailKey, Weak<ThumbnailImage>>,
    failed: HashMap<ThumbnailKey, ThumbnailError>,
}

struct LoaderInner {
    slots: Mutex<Slots>,
    in_flight: Mutex<HashMap<ThumbnailKey, InFlightLoad>>,
    listeners: ListenerRegistry,
    disk_cache: ThumbnailDiskCache,
    downloader: Arc<dyn ImageDownloadPort>,
    disk_cache_enabled: AtomicBool,
    next_generation: AtomicU64,
}

/// Process-wide thumbnail cache. Cloning yields another handle to the same
/// cache.
#[derive(Clone)]
pub struct ThumbnailLoader {
    inner: Arc<LoaderInner>,
}

impl std::fmt::Debug for ThumbnailLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailLoader")
            .field("disk_cache", &self.inner.disk_cache)
            .field("disk_cache_enabled", &self.disk_cache_enabled())
            .finish_non_exhaustive()
    }
}

impl ThumbnailLoader {
    /// Creates a loader on top of the given disk cache and downloader.
    #[must_use]
    pub fn new(
        config: &ThumbnailLoaderConfig,
        disk_cache: ThumbnailDiskCache,
        downloader: Arc<dyn ImageDownloadPort>,
    ) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                slots: Mutex::new(Slots::default()),
                in_flight: Mutex::new(HashMap::new()),
                listeners: ListenerRegistry::new(),
                disk_cache,
                downloader,
                disk_cache_enabled: AtomicBool::new(config.disk_cache_enabled),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the disk cache used by this loader.
    #[must_use]
    pub fn disk_cache(&self) -> &ThumbnailDiskCache {
        &self.inner.disk_cache
    }

    /// Returns true if successful downloads are written to disk.
    #[must_use]
    pub fn disk_cache_enabled(&self) -> bool {
        self.inner.disk_cache_enabled.load(Ordering::Relaxed)
    }

    /// Turns disk cache writes on or off. Reads are unaffected.
    pub fn set_disk_cache_enabled(&self, enabled: bool) {
        self.inner
            .disk_cache_enabled
            .store(enabled, Ordering::Relaxed);
        debug!(enabled, "Thumbnail disk cache toggled");
    }

    /// Returns the cached image for `key` if something else still holds it.
    /// Never starts a fetch.
    #[must_use]
    pub fn get_loaded_thumbnail(&self, key: &ThumbnailKey) -> Option<Arc<ThumbnailImage>> {
        let mut slots = self.inner.slots.lock();
        let image = slots.loaded.get(key).and_then(Weak::upgrade);
        if image.is_none() && slots.loaded.remove(key).is_some() {
            trace!(key = %key, "Weak slot reclaimed");
        }
        image
    }

    /// Loads a thumbnail, fetching it at most once per key.
    ///
    /// # Errors
    /// Returns `NoUrlAvailable` if the provider has no URL for `quality`,
    /// otherwise the outcome of the shared fetch.
    pub async fn load_thumbnail(
        &self,
        item: &MediaItemId,
        quality: ThumbnailQuality,
        provider: &dyn ThumbnailProvider,
        options: LoadOptions,
    ) -> ThumbnailResult<Arc<ThumbnailImage>> {
        self.load_thumbnail_with_source(item, quality, provider, options)
            .await
            .map(|loaded| loaded.image)
    }

    /// Like [`Self::load_thumbnail`], also reporting where the image came from.
    ///
    /// # Errors
    /// See [`Self::load_thumbnail`].
    pub async fn load_thumbnail_with_source(
        &self,
        item: &MediaItemId,
        quality: ThumbnailQuality,
        provider: &dyn ThumbnailProvider,
        options: LoadOptions,
    ) -> ThumbnailResult<LoadedThumbnail> {
        let key = ThumbnailKey::new(provider.provider_id(), quality, item.clone());

        if let Some(image) = self.get_loaded_thumbnail(&key) {
            trace!(key = %key, "Memory cache hit");
            return Ok(LoadedThumbnail {
                image,
                source: ThumbnailSource::Memory,
            });
        }

        let Some(url) = provider.thumbnail_url(quality) else {
            debug!(key = %key, "No thumbnail URL available");
            return Err(ThumbnailError::NoUrlAvailable { quality });
        };

        self.join_or_start(key, url, options).await
    }

    /// Loads a thumbnail using the provider stored for the item.
    ///
    /// # Errors
    /// Returns `NoProvider` if the lookup knows no provider for the item,
    /// otherwise see [`Self::load_thumbnail`].
    pub async fn load_item_thumbnail(
        &self,
        item: &MediaItemId,
        quality: ThumbnailQuality,
        lookup: &dyn ThumbnailProviderLookup,
    ) -> ThumbnailResult<Arc<ThumbnailImage>> {
        let Some(provider) = lookup.thumbnail_provider(item).await else {
            return Err(ThumbnailError::NoProvider { item: item.clone() });
        };
        self.load_thumbnail(item, quality, provider.as_ref(), LoadOptions::default())
            .await
    }

    /// Drops every cached copy of an item's thumbnails, on disk and in memory.
    ///
    /// In-flight fetches are not cancelled; one that completes afterwards
    /// fills the caches again.
    pub async fn invalidate(&self, item: &MediaItemId) {
        let removed_files = self.inner.disk_cache.remove_item(item).await;

        let removed_slots = {
            let mut slots = self.inner.slots.lock();
            let before = slots.loaded.len();
            slots.loaded.retain(|key, _| &key.item_id != item);
            slots.failed.retain(|key, _| &key.item_id != item);
            before - slots.loaded.len()
        };

        debug!(item = %item, removed_files, removed_slots, "Invalidated thumbnails");
    }

    /// Returns the current state of a key.
    #[must_use]
    pub fn load_state(&self, key: &ThumbnailKey) -> LoadState {
        if self.is_loading(key) {
            return LoadState::InFlight;
        }
        if let Some(image) = self.get_loaded_thumbnail(key) {
            return LoadState::Completed(image);
        }
        self.inner
            .slots
            .lock()
            .failed
            .get(key)
            .cloned()
            .map_or(LoadState::NotStarted, LoadState::Failed)
    }

    /// Returns true if a fetch is running for `key`.
    #[must_use]
    pub fn is_loading(&self, key: &ThumbnailKey) -> bool {
        self.inner.in_flight.lock().contains_key(key)
    }

    /// Returns the number of running fetches.
    #[must_use]
    pub fn loading_count(&self) -> usize {
        self.inner.in_flight.lock().len()
    }

    /// Drops weak slots whose images have been released. Returns how many
    /// were dropped.
    pub fn purge_reclaimed(&self) -> usize {
        let mut slots = self.inner.slots.lock();
        let before = slots.loaded.len();
        slots.loaded.retain(|_, image| image.strong_count() > 0);
        before - slots.loaded.len()
    }

    /// Registers a load listener.
    pub fn add_listener(&self, listener: Arc<dyn ThumbnailLoadListener>) -> ListenerId {
        self.inner.listeners.add(listener)
    }

    /// Unregisters a load listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    fn join_or_start(
        &self,
        key: ThumbnailKey,
        url: String,
        options: LoadOptions,
    ) -> SharedFetch {
        let mut in_flight = self.inner.in_flight.lock();
        if let Some(load) = in_flight.get(&key) {
            trace!(key = %key, "Joining in-flight load");
            return load.fetch.clone();
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let handle = tokio::spawn(Arc::clone(&self.inner).run_fetch(
            key.clone(),
            url,
            options,
            generation,
        ));

        // The task owns the fetch, so callers that stop awaiting do not cancel it.
        let inner = Arc::clone(&self.inner);
        let join_key = key.clone();
        let fetch = async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!(key = %join_key, error = %e, "Thumbnail fetch task failed");
                    let error = ThumbnailError::task(e.to_string());
                    inner
                        .slots
                        .lock()
                        .failed
                        .insert(join_key.clone(), error.clone());
                    inner.listeners.notify_failed(&join_key, &error);
                    inner.finish_in_flight(&join_key, generation);
                    Err(error)
                }
            }
        }
        .boxed()
        .shared();

        in_flight.insert(
            key,
            InFlightLoad {
                generation,
                fetch: fetch.clone(),
            },
        );
        fetch
    }
}

impl LoaderInner {
    async fn run_fetch(
        self: Arc<Self>,
        key: ThumbnailKey,
        url: String,
        options: LoadOptions,
        generation: u64,
    ) -> ThumbnailResult<LoadedThumbnail> {
        self.slots.lock().failed.remove(&key);
        self.listeners.notify_started(&key);
        debug!(key = %key, url = %url, "Thumbnail load started");

        let result = self.fetch(&key, &url, options).await;

        {
            let mut slots = self.slots.lock();
            match &result {
                Ok(loaded) if !options.disable_cache_write => {
                    slots
                        .loaded
                        .insert(key.clone(), Arc::downgrade(&loaded.image));
                }
                Ok(_) => {}
                Err(e) => {
                    slots.failed.insert(key.clone(), e.clone());
                }
            }
        }

        // Listeners hear the terminal event while the key is still owned, so a
        // caller arriving during dispatch joins this attempt.
        match &result {
            Ok(loaded) => {
                debug!(key = %key, source = %loaded.source, "Thumbnail loaded");
                self.listeners.notify_finished(&key, &loaded.image);
            }
            Err(e) => {
                debug!(key = %key, error = %e, "Thumbnail load failed");
                self.listeners.notify_failed(&key, e);
            }
        }

        self.finish_in_flight(&key, generation);

        result
    }

    async fn fetch(
        &self,
        key: &ThumbnailKey,
        url: &str,
        options: LoadOptions,
    ) -> ThumbnailResult<LoadedThumbnail> {
        if !options.disable_cache_read
            && let Some(bytes) = self.disk_cache.read(&key.item_id, key.quality).await?
        {
            let image = codec::decode(bytes).await?;
            return Ok(LoadedThumbnail {
                image: Arc::new(image),
                source: ThumbnailSource::Disk,
            });
        }

        let bytes = self.downloader.download_image(url).await?;
        let image = Arc::new(codec::decode(bytes.clone()).await?);

        if !options.disable_cache_write
            && self.disk_cache_enabled.load(Ordering::Relaxed)
            && let Err(e) = self.persist(key, bytes, &image).await
        {
            warn!(key = %key, error = %e, "Failed to cache thumbnail to disk");
        }

        Ok(LoadedThumbnail {
            image,
            source: ThumbnailSource::Network,
        })
    }

    async fn persist(
        &self,
        key: &ThumbnailKey,
        bytes: Bytes,
        image: &Arc<ThumbnailImage>,
    ) -> ThumbnailResult<()> {
        let encoded = if matches!(image::guess_format(&bytes), Ok(image::ImageFormat::Png)) {
            bytes.to_vec()
        } else {
            codec::encode_png(Arc::clone(image)).await?
        };
        self.disk_cache
            .write(&key.item_id, key.quality, &encoded)
            .await
    }

    fn finish_in_flight(&self, key: &ThumbnailKey, generation: u64) {
        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(key)
            .is_some_and(|load| load.generation == generation)
        {
            in_flight.remove(key);
        }
    }
}
