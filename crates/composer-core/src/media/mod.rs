//! Media handling: compression, thumbnails and the HTTP transport.

pub mod client;
pub mod compress;
pub mod thumbnail;

pub use client::HttpComposerClient;
pub use compress::{scaled_dimensions, ImageCompressor, COMPRESSED_MIME_TYPE};
pub use thumbnail::{generate_thumbnail, ThumbnailImage, ThumbnailOptions};
