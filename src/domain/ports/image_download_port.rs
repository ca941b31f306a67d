//! Port definition for downloading raw image bytes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::ThumbnailResult;

/// Port for fetching encoded image bytes from a URL.
/// Implementations must be thread-safe.
#[async_trait]
pub trait ImageDownloadPort: Send + Sync {
    /// Downloads the encoded image at `url`.
    async fn download_image(&self, url: &str) -> ThumbnailResult<Bytes>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;

    use crate::domain::errors::ThumbnailError;

    /// Encodes a solid-colour PNG of the given size.
    pub fn sample_png(width: u32, height: u32) -> Bytes {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 90]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .expect("encode sample png");
        Bytes::from(buf.into_inner())
    }

    /// Mock downloader that counts calls.
    pub struct MockImageDownloader {
        body: Bytes,
        delay: Duration,
        should_fail: Arc<AtomicBool>,
        calls: Arc<AtomicUsize>,
        urls: Arc<Mutex<Vec<String>>>,
    }

    impl MockImageDownloader {
        /// Creates a downloader that serves a small PNG.
        pub fn new() -> Self {
            Self::with_body(sample_png(4, 3))
        }

        /// Creates a downloader that serves the given bytes.
        pub fn with_body(body: Bytes) -> Self {
            Self {
                body,
                delay: Duration::ZERO,
                should_fail: Arc::new(AtomicBool::new(false)),
                calls: Arc::new(AtomicUsize::new(0)),
                urls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Sleeps this long inside every download.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        /// Sets failure behaviour.
        pub fn set_should_fail(&self, value: bool) {
            self.should_fail.store(value, Ordering::SeqCst);
        }

        /// Number of downloads performed.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// URLs requested, in call order.
        pub fn urls(&self) -> Vec<String> {
            self.urls.lock().clone()
        }
    }

    impl Default for MockImageDownloader {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ImageDownloadPort for MockImageDownloader {
        async fn download_image(&self, url: &str) -> ThumbnailResult<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().push(url.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(ThumbnailError::download("mock failure"));
            }
            Ok(self.body.clone())
        }
    }
}
