//! Image decode/encode on the blocking pool.

use std::io::Cursor;

use crate::domain::entities::ThumbnailImage;
use crate::domain::errors::{ThumbnailError, ThumbnailResult};

/// Decodes encoded image bytes, guessing the format from the content.
///
/// # Errors
/// Returns `DecodeFailed` if the bytes are not a supported image.
pub async fn decode(bytes: impl AsRef<[u8]> + Send + 'static) -> ThumbnailResult<ThumbnailImage> {
    tokio::task::spawn_blocking(move || image::load_from_memory(bytes.as_ref()))
        .await
        .map_err(|e| ThumbnailError::task(format!("Decode task panicked: {e}")))?
        .map_err(|e| ThumbnailError::decode(e.to_string()))
}

/// Encodes an image as PNG, the format of every disk cache file.
///
/// # Errors
/// Returns `DiskWriteFailed` if encoding fails.
pub async fn encode_png(image: std::sync::Arc<ThumbnailImage>) -> ThumbnailResult<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        let mut buf = Cursor::new(Vec::new());
        image
            .write_to(&mut buf, image::ImageFormat::Png)
            .map(|()| buf.into_inner())
    })
    .await
    .map_err(|e| ThumbnailError::task(format!("Encode task panicked: {e}")))?
    .map_err(|e| ThumbnailError::disk_write(format!("Failed to encode PNG: {e}")))
}
