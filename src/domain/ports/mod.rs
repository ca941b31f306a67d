mod image_download_port;
mod load_listener_port;
mod thumbnail_provider_port;

pub use image_download_port::ImageDownloadPort;
pub use load_listener_port::ThumbnailLoadListener;
pub use thumbnail_provider_port::{ThumbnailProvider, ThumbnailProviderLookup};
