//! Observer port for thumbnail load progress.

use std::sync::Arc;

use crate::domain::entities::{ThumbnailImage, ThumbnailKey};
use crate::domain::errors::ThumbnailError;

/// Receives load progress for every key.
///
/// For one load attempt a listener sees `on_load_started` before exactly one
/// of `on_load_finished` or `on_load_failed`. Callbacks may run on any thread
/// and must not block.
pub trait ThumbnailLoadListener: Send + Sync {
    /// A fetch for `key` has started.
    fn on_load_started(&self, _key: &ThumbnailKey) {}

    /// The fetch for `key` produced `image`.
    fn on_load_finished(&self, _key: &ThumbnailKey, _image: &Arc<ThumbnailImage>) {}

    /// The fetch for `key` failed.
    fn on_load_failed(&self, _key: &ThumbnailKey, _error: &ThumbnailError) {}
}
