//! Load listener registry and the channel-forwarding listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::trace;

use crate::domain::entities::{ThumbnailImage, ThumbnailKey};
use crate::domain::errors::ThumbnailError;
use crate::domain::ports::ThumbnailLoadListener;

/// Handle returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ListenerList = Vec<(ListenerId, Arc<dyn ThumbnailLoadListener>)>;

/// Copy-on-write listener list.
///
/// Dispatch iterates a snapshot, so listeners can be added or removed while
/// events are being delivered. A listener removed during a dispatch may still
/// receive that one event.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Arc<ListenerList>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn add(&self, listener: Arc<dyn ThumbnailLoadListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut guard = self.listeners.write();
        let mut list = ListenerList::clone(&guard);
        list.push((id, listener));
        *guard = Arc::new(list);
        trace!(listener = id.0, "Registered load listener");
        id
    }

    /// Unregisters a listener. Returns false if it was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut guard = self.listeners.write();
        if !guard.iter().any(|(existing, _)| *existing == id) {
            return false;
        }
        let list: ListenerList = guard
            .iter()
            .filter(|(existing, _)| *existing != id)
            .cloned()
            .collect();
        *guard = Arc::new(list);
        trace!(listener = id.0, "Removed load listener");
        true
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns true if no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Arc<ListenerList> {
        Arc::clone(&self.listeners.read())
    }

    pub(crate) fn notify_started(&self, key: &ThumbnailKey) {
        for (_, listener) in self.snapshot().iter() {
            listener.on_load_started(key);
        }
    }

    pub(crate) fn notify_finished(&self, key: &ThumbnailKey, image: &Arc<ThumbnailImage>) {
        for (_, listener) in self.snapshot().iter() {
            listener.on_load_finished(key, image);
        }
    }

    pub(crate) fn notify_failed(&self, key: &ThumbnailKey, error: &ThumbnailError) {
        for (_, listener) in self.snapshot().iter() {
            listener.on_load_failed(key, error);
        }
    }
}

/// What happened to a key.
#[derive(Debug, Clone)]
pub enum ThumbnailEventKind {
    /// A fetch started.
    Started,
    /// The fetch produced an image.
    Finished(Arc<ThumbnailImage>),
    /// The fetch failed.
    Failed(ThumbnailError),
}

/// Message sent for every load event.
#[derive(Debug, Clone)]
pub struct ThumbnailEvent {
    /// The key the event is about.
    pub key: ThumbnailKey,
    /// The event.
    pub kind: ThumbnailEventKind,
}

/// Forwards load events over an unbounded channel, for consumers that poll
/// from their own loop.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    event_tx: mpsc::UnboundedSender<ThumbnailEvent>,
}

impl ChannelListener {
    /// Creates a listener and the receiving end of its channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ThumbnailEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { event_tx }, event_rx)
    }

    fn send(&self, key: &ThumbnailKey, kind: ThumbnailEventKind) {
        // A closed receiver only means nobody is listening any more.
        let _ = self.event_tx.send(ThumbnailEvent {
            key: key.clone(),
            kind,
        });
    }
}

impl ThumbnailLoadListener for ChannelListener {
    fn on_load_started(&self, key: &ThumbnailKey) {
        self.send(key, ThumbnailEventKind::Started);
    }

    fn on_load_finished(&self, key: &ThumbnailKey, image: &Arc<ThumbnailImage>) {
        self.send(key, ThumbnailEventKind::Finished(Arc::clone(image)));
    }

    fn on_load_failed(&self, key: &ThumbnailKey, error: &ThumbnailError) {
        self.send(key, ThumbnailEventKind::Failed(error.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ProviderId, ThumbnailQuality};
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingListener {
        started: AtomicUsize,
    }

    impl ThumbnailLoadListener for CountingListener {
        fn on_load_started(&self, _key: &ThumbnailKey) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn key() -> ThumbnailKey {
        ThumbnailKey::new(ProviderId::new("p"), ThumbnailQuality::Low, "abc".into())
    }

    #[test]
    fn test_add_and_remove() {
        let registry = ListenerRegistry::new();
        let listener = Arc::new(CountingListener::default());

        let id = registry.add(listener.clone());
        registry.notify_started(&key());
        assert_eq!(listener.started.load(Ordering::SeqCst), 1);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        registry.notify_started(&key());
        assert_eq!(listener.started.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    struct SelfRemovingListener {
        registry: Arc<ListenerRegistry>,
        id: parking_lot::Mutex<Option<ListenerId>>,
        calls: AtomicUsize,
    }

    impl ThumbnailLoadListener for SelfRemovingListener {
        fn on_load_started(&self, _key: &ThumbnailKey) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = self.id.lock().take() {
                self.registry.remove(id);
            }
        }
    }

    #[test]
    fn test_removal_during_dispatch() {
        let registry = Arc::new(ListenerRegistry::new());
        let listener = Arc::new(SelfRemovingListener {
            registry: registry.clone(),
            id: parking_lot::Mutex::new(None),
            calls: AtomicUsize::new(0),
        });
        let other = Arc::new(CountingListener::default());

        let id = registry.add(listener.clone());
        *listener.id.lock() = Some(id);
        registry.add(other.clone());

        registry.notify_started(&key());
        registry.notify_started(&key());

        assert_eq!(listener.calls.load(Ordering::SeqCst), 1);
        assert_eq!(other.started.load(Ordering::SeqCst), 2);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_channel_listener_forwards_events() {
        let (listener, mut rx) = ChannelListener::channel();
        let image = Arc::new(ThumbnailImage::new_rgb8(1, 1));

        listener.on_load_started(&key());
        listener.on_load_finished(&key(), &image);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.key, key());
        assert!(matches!(first.kind, ThumbnailEventKind::Started));

        let second = rx.recv().await.unwrap();
        assert!(matches!(second.kind, ThumbnailEventKind::Finished(img) if Arc::ptr_eq(&img, &image)));
    }

    #[tokio::test]
    async fn test_channel_drains_after_listener_removed() {
        let registry = ListenerRegistry::new();
        let (listener, mut rx) = ChannelListener::channel();
        let id = registry.add(Arc::new(listener));
        let image = Arc::new(ThumbnailImage::new_rgb8(1, 1));

        registry.notify_started(&key());
        registry.notify_finished(&key(), &image);
        assert!(registry.remove(id));

        let drained = tokio::spawn(async move {
            let mut kinds = Vec::new();
            while let Some(event) = rx.recv().await {
                kinds.push(event.kind);
            }
            kinds
        });
        let kinds = tokio::time::timeout(std::time::Duration::from_secs(1), drained)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(kinds.len(), 2);
        assert!(matches!(kinds[1], ThumbnailEventKind::Finished(_)));
    }
}
