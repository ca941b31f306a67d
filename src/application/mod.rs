//! Application layer with state projections built on the loader.

/// Service implementations.
pub mod services;

pub use services::{ItemStateObserver, ItemThumbnailState};
