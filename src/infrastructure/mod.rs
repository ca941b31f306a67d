//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Thumbnail handling (loading, caching, downloading).
pub mod image;
/// Thumbnail provider adapters.
pub mod providers;

pub use config::{
    AppConfig, CacheConfig, CliArgs, Command, ConfigNotice, LogLevel, StorageManager,
};
pub use image::{
    ChannelListener, HttpImageDownloader, LoadOptions, LoadedThumbnail, ThumbnailDiskCache,
    ThumbnailEvent, ThumbnailLoader, ThumbnailLoaderConfig,
};
pub use providers::{DynamicThumbnailProvider, InMemoryProviderLookup, ThumbnailSet};
