//! Domain entity definitions.

mod load_state;
mod thumbnail;

pub use load_state::LoadState;
pub use thumbnail::{
    MediaItemId, ProviderId, ThumbnailImage, ThumbnailKey, ThumbnailQuality, ThumbnailSource,
};
