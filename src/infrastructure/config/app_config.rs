//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::infrastructure::image::{
    HttpDownloaderConfig, ThumbnailDiskCache, ThumbnailLoaderConfig, default_cache_root,
};

pub(crate) const APP_NAME: &str = "thumbloader";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "thumbloader";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Thumbnail cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Thumbnail cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Write downloaded thumbnails to disk.
    #[serde(default = "default_true")]
    pub thumbnail_cache_enabled: bool,

    /// Cache root. Thumbnails go in its `thumbnails/` subdirectory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Download timeout in seconds.
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// Maximum concurrent downloads across all thumbnails.
    #[serde(default = "default_max_concurrent_downloads")]
    pub max_concurrent_downloads: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            thumbnail_cache_enabled: true,
            cache_dir: None,
            download_timeout_secs: default_download_timeout(),
            max_concurrent_downloads: default_max_concurrent_downloads(),
        }
    }
}

impl CacheConfig {
    /// Returns the configured cache root or the platform default.
    #[must_use]
    pub fn effective_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_root)
    }

    /// Builds the disk cache for this configuration.
    #[must_use]
    pub fn disk_cache(&self) -> ThumbnailDiskCache {
        ThumbnailDiskCache::new(self.effective_cache_dir())
    }

    /// Loader settings derived from this configuration.
    #[must_use]
    pub fn loader_config(&self) -> ThumbnailLoaderConfig {
        ThumbnailLoaderConfig {
            disk_cache_enabled: self.thumbnail_cache_enabled,
        }
    }

    /// Downloader settings derived from this configuration.
    #[must_use]
    pub fn downloader_config(&self) -> HttpDownloaderConfig {
        HttpDownloaderConfig {
            max_concurrent_downloads: self.max_concurrent_downloads,
            timeout_secs: self.download_timeout_secs,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_download_timeout() -> u64 {
    30
}

fn default_max_concurrent_downloads() -> usize {
    4
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.cache.cache_dir = Some(cache_dir.clone());
        }
        if let Some(enabled) = args.thumbnail_cache {
            self.cache.thumbnail_cache_enabled = enabled;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_cache_section() {
        let toml_content = r#"
            log_level = "debug"

            [cache]
            thumbnail_cache_enabled = false
            cache_dir = "/var/cache/thumbs"
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(!config.cache.thumbnail_cache_enabled);
        assert_eq!(
            config.cache.effective_cache_dir(),
            PathBuf::from("/var/cache/thumbs")
        );
        assert_eq!(config.cache.download_timeout_secs, 30);
        assert_eq!(config.cache.max_concurrent_downloads, 4);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.log_path.is_none());
        assert!(config.cache.thumbnail_cache_enabled);
        assert!(config.cache.loader_config().disk_cache_enabled);
    }

    #[test]
    fn test_args_override_file_values() {
        let mut config: AppConfig = toml::from_str(
            r#"
            [cache]
            thumbnail_cache_enabled = true
            "#,
        )
        .unwrap();
        let args = CliArgs::parse_from([
            "thumbloader",
            "--thumbnail-cache",
            "false",
            "--cache-dir",
            "/tmp/thumbs",
            "--log-level",
            "trace",
            "path",
            "abc",
        ]);

        config.merge_with_args(&args);

        assert!(!config.cache.thumbnail_cache_enabled);
        assert_eq!(config.cache.cache_dir, Some(PathBuf::from("/tmp/thumbs")));
        assert_eq!(config.log_level, LogLevel::Trace);
    }
}
