pub mod item_state;

pub use item_state::{ItemStateObserver, ItemThumbnailState};
