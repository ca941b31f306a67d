//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{MediaItemId, ThumbnailKey, ThumbnailQuality};
pub use errors::{ThumbnailError, ThumbnailResult};
pub use ports::{ImageDownloadPort, ThumbnailLoadListener, ThumbnailProvider};
