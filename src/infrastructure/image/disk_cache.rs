//! Disk-based thumbnail cache for persistence across sessions.

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

use crate::domain::entities::{MediaItemId, ThumbnailQuality};
use crate::domain::errors::{ThumbnailError, ThumbnailResult};

/// Subdirectory of the cache root holding thumbnail files.
pub const THUMBNAIL_DIR: &str = "thumbnails";

/// Extension of cached thumbnail files. Content is always PNG.
pub const THUMBNAIL_EXTENSION: &str = "png";

/// Disk cache keyed by item id and quality.
///
/// Files live at `<root>/thumbnails/<item_id>.<quality_ordinal>.png`. The
/// presence of a file means the thumbnail was fetched before.
#[derive(Debug, Clone)]
pub struct ThumbnailDiskCache {
    root: PathBuf,
}

impl ThumbnailDiskCache {
    /// Creates a cache rooted at `root`. Nothing is created on disk until the
    /// first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a cache in the platform cache directory.
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(default_cache_root())
    }

    /// Returns the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the deterministic path for an item's thumbnail at `quality`.
    ///
    /// The item id is escaped so the file always lands directly inside the
    /// thumbnail directory.
    #[must_use]
    pub fn path_for(&self, item: &MediaItemId, quality: ThumbnailQuality) -> PathBuf {
        self.root.join(THUMBNAIL_DIR).join(format!(
            "{}.{}.{THUMBNAIL_EXTENSION}",
            file_stem(item),
            quality.ordinal()
        ))
    }

    /// Checks if a thumbnail is cached.
    pub async fn contains(&self, item: &MediaItemId, quality: ThumbnailQuality) -> bool {
        fs::try_exists(self.path_for(item, quality))
            .await
            .unwrap_or(false)
    }

    /// Reads cached bytes. Returns `Ok(None)` on a cache miss.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read.
    pub async fn read(
        &self,
        item: &MediaItemId,
        quality: ThumbnailQuality,
    ) -> ThumbnailResult<Option<Vec<u8>>> {
        let path = self.path_for(item, quality);
        match fs::read(&path).await {
            Ok(bytes) => {
                trace!(item = %item, quality = %quality, path = %path.display(), "Disk cache hit");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!(item = %item, quality = %quality, "Disk cache miss");
                Ok(None)
            }
            Err(e) => Err(ThumbnailError::io(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Stores encoded bytes, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns `DiskWriteFailed` if the directory or file cannot be written.
    pub async fn write(
        &self,
        item: &MediaItemId,
        quality: ThumbnailQuality,
        bytes: &[u8],
    ) -> ThumbnailResult<()> {
        let path = self.path_for(item, quality);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ThumbnailError::disk_write(format!("Failed to create cache dir: {e}")))?;
        }

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| ThumbnailError::disk_write(format!("Failed to create cache file: {e}")))?;

        file.write_all(bytes)
            .await
            .map_err(|e| ThumbnailError::disk_write(format!("Failed to write cache file: {e}")))?;

        file.flush()
            .await
            .map_err(|e| ThumbnailError::disk_write(format!("Failed to flush cache file: {e}")))?;

        debug!(item = %item, quality = %quality, path = %path.display(), size = bytes.len(), "Stored thumbnail in disk cache");
        Ok(())
    }

    /// Removes one cached thumbnail. Returns true if a file was deleted.
    pub async fn remove(&self, item: &MediaItemId, quality: ThumbnailQuality) -> bool {
        let path = self.path_for(item, quality);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(item = %item, quality = %quality, "Removed thumbnail from disk cache");
                true
            }
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!(item = %item, quality = %quality, error = %e, "Failed to remove cached thumbnail");
                }
                false
            }
        }
    }

    /// Removes the cached thumbnails of every quality for an item.
    /// Returns the number of files deleted.
    pub async fn remove_item(&self, item: &MediaItemId) -> usize {
        let mut removed = 0;
        for quality in ThumbnailQuality::ALL {
            if self.remove(item, quality).await {
                removed += 1;
            }
        }
        removed
    }
}

/// Percent-encodes every byte of the id outside `[A-Za-z0-9._-]`, so path
/// separators never reach the file system.
fn file_stem(item: &MediaItemId) -> String {
    let mut stem = String::with_capacity(item.as_str().len());
    for byte in item.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
            stem.push(char::from(byte));
        } else {
            let _ = write!(stem, "%{byte:02X}");
        }
    }
    stem
}

/// Returns the default cache root directory.
#[must_use]
pub fn default_cache_root() -> PathBuf {
    directories::ProjectDirs::from("com", "thumbloader", "thumbloader").map_or_else(
        || std::env::temp_dir().join("thumbloader").join("cache"),
        |dirs| dirs.cache_dir().to_path_buf(),
    )
}
