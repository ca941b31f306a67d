//! Thumbnail provider adapters.

pub mod dynamic;
pub mod lookup;
pub mod thumbnail_set;

pub use dynamic::DynamicThumbnailProvider;
pub use lookup::InMemoryProviderLookup;
pub use thumbnail_set::{ThumbnailSet, ThumbnailVariant};
