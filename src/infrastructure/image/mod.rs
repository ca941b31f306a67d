//! Image handling infrastructure.
//!
//! This module provides:
//! - Weak in-memory slots with per-key request coalescing
//! - Disk caching keyed by item and quality
//! - PNG encode and format-sniffing decode on the blocking pool
//! - HTTP downloads with bounded concurrency
//! - Load listeners

pub mod codec;
pub mod disk_cache;
pub mod http_downloader;
pub mod listeners;
pub mod loader;

pub use disk_cache::{ThumbnailDiskCache, default_cache_root};
pub use http_downloader::{HttpDownloaderConfig, HttpImageDownloader};
pub use listeners::{ChannelListener, ListenerId, ListenerRegistry, ThumbnailEvent, ThumbnailEventKind};
pub use loader::{LoadOptions, LoadedThumbnail, ThumbnailLoader, ThumbnailLoaderConfig};
