//! Thumbnail loading error types.

use thiserror::Error;

use crate::domain::entities::{MediaItemId, ThumbnailQuality};

/// Result type for thumbnail operations.
pub type ThumbnailResult<T> = std::result::Result<T, ThumbnailError>;

/// Thumbnail loading error variants.
///
/// `Clone` so a single fetch outcome can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ThumbnailError {
    #[error("no thumbnail URL available for quality {quality}")]
    NoUrlAvailable { quality: ThumbnailQuality },

    #[error("item {item} has no thumbnail provider")]
    NoProvider { item: MediaItemId },

    #[error("thumbnail download failed: {message}")]
    DownloadFailed { message: String },

    #[error("failed to write thumbnail cache file: {message}")]
    DiskWriteFailed { message: String },

    #[error("failed to decode thumbnail: {message}")]
    DecodeFailed { message: String },

    #[error("thumbnail cache I/O error: {message}")]
    Io { message: String },

    #[error("thumbnail fetch task failed: {message}")]
    TaskFailed { message: String },
}

impl ThumbnailError {
    /// Creates download failed error.
    #[must_use]
    pub fn download(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Creates disk write failed error.
    #[must_use]
    pub fn disk_write(message: impl Into<String>) -> Self {
        Self::DiskWriteFailed {
            message: message.into(),
        }
    }

    /// Creates decode failed error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    /// Creates I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates task failed error.
    #[must_use]
    pub fn task(message: impl Into<String>) -> Self {
        Self::TaskFailed {
            message: message.into(),
        }
    }

    /// Returns true if retrying the same key cannot succeed.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::NoUrlAvailable { .. } | Self::NoProvider { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_errors() {
        assert!(
            ThumbnailError::NoUrlAvailable {
                quality: ThumbnailQuality::High
            }
            .is_permanent()
        );
        assert!(ThumbnailError::NoProvider { item: "abc".into() }.is_permanent());
        assert!(!ThumbnailError::download("timeout").is_permanent());
        assert!(!ThumbnailError::decode("bad header").is_permanent());
    }

    #[test]
    fn test_error_messages() {
        let err = ThumbnailError::NoUrlAvailable {
            quality: ThumbnailQuality::Low,
        };
        assert_eq!(err.to_string(), "no thumbnail URL available for quality low");

        let err = ThumbnailError::download("HTTP 404");
        assert_eq!(err.to_string(), "thumbnail download failed: HTTP 404");
    }
}
