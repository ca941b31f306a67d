//! thumbloader - deduplicating thumbnail loader for media clients.
//!
//! Thumbnails are addressed by item, quality and provider. Each key is
//! fetched at most once at a time, kept in memory only while something else
//! holds the image, and persisted to disk for later runs.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing state projections.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing the loader and its adapters.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "thumbloader";
