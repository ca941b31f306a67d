//! Domain error types.

mod thumbnail_error;

pub use thumbnail_error::{ThumbnailError, ThumbnailResult};
