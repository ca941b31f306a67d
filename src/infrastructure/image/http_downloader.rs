//! HTTP image downloader.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::domain::errors::{ThumbnailError, ThumbnailResult};
use crate::domain::ports::ImageDownloadPort;

const USER_AGENT: &str = concat!("thumbloader/", env!("CARGO_PKG_VERSION"));

/// Configuration for the HTTP downloader.
#[derive(Debug, Clone)]
pub struct HttpDownloaderConfig {
    /// Maximum concurrent downloads across all keys.
    pub max_concurrent_downloads: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpDownloaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: 4,
            timeout_secs: 30,
        }
    }
}

/// Downloads thumbnails over HTTP with bounded concurrency.
pub struct HttpImageDownloader {
    client: reqwest::Client,
    permits: Arc<Semaphore>,
}

impl std::fmt::Debug for HttpImageDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpImageDownloader")
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}

impl HttpImageDownloader {
    /// Creates a new downloader.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &HttpDownloaderConfig) -> ThumbnailResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ThumbnailError::download(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(config.max_concurrent_downloads.max(1))),
        })
    }
}

#[async_trait]
impl ImageDownloadPort for HttpImageDownloader {
    async fn download_image(&self, url: &str) -> ThumbnailResult<Bytes> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| ThumbnailError::download(format!("Download limiter closed: {e}")))?;

        debug!(url = %url, "Downloading thumbnail");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Thumbnail request failed");
            if e.is_timeout() {
                ThumbnailError::download("request timed out")
            } else if e.is_connect() {
                ThumbnailError::download(format!("failed to connect: {e}"))
            } else {
                ThumbnailError::download(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ThumbnailError::download(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| ThumbnailError::download(format!("Failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downloader_creation() {
        let downloader = HttpImageDownloader::new(&HttpDownloaderConfig::default());
        assert!(downloader.is_ok());
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let config = HttpDownloaderConfig {
            max_concurrent_downloads: 0,
            timeout_secs: 1,
        };
        let downloader = HttpImageDownloader::new(&config).unwrap();
        assert_eq!(downloader.permits.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_download_error() {
        let config = HttpDownloaderConfig {
            max_concurrent_downloads: 1,
            timeout_secs: 2,
        };
        let downloader = HttpImageDownloader::new(&config).unwrap();
        let result = downloader.download_image("http://127.0.0.1:9/thumb.png").await;
        assert!(matches!(result, Err(ThumbnailError::DownloadFailed { .. })));
    }
}
