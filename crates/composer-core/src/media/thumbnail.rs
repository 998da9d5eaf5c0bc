//! Preview thumbnails for the staged file list.
//!
//! Previews are small JPEGs shown inline as `data:` URIs, so they are bounded
//! to a square edge and never upscaled.

use std::io::Cursor;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use image::{codecs::jpeg::JpegEncoder, DynamicImage, GenericImageView};

use crate::config::DEFAULT_THUMBNAIL_SIZE;
use crate::{Error, Result};

const PREVIEW_JPEG_QUALITY: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailOptions {
    /// Bounding square edge in pixels.
    pub max_edge: u32,
    pub jpeg_quality: u8,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            max_edge: DEFAULT_THUMBNAIL_SIZE,
            jpeg_quality: PREVIEW_JPEG_QUALITY,
        }
    }
}

/// Encoded preview and its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ThumbnailImage {
    /// `data:` URI for the preview's `<img src>`.
    pub fn data_uri(&self) -> String {
        let encoded = BASE64_STANDARD.encode(&self.bytes);
        format!("data:image/jpeg;base64,{encoded}")
    }
}

/// Build a staged-file preview from raw attachment bytes.
pub fn generate_thumbnail(
    attachment_bytes: &[u8],
    options: ThumbnailOptions,
) -> Result<ThumbnailImage> {
    if options.max_edge == 0 {
        return Err(Error::InvalidInput("preview edge must be positive".to_string()));
    }
    if attachment_bytes.is_empty() {
        return Err(Error::ImageDecode("attachment is empty".to_string()));
    }

    let decoded = image::load_from_memory(attachment_bytes)
        .map_err(|error| Error::ImageDecode(format!("preview: {error}")))?;

    let fits = {
        let (width, height) = decoded.dimensions();
        width.max(height) <= options.max_edge
    };
    let preview = if fits {
        decoded
    } else {
        decoded.thumbnail(options.max_edge, options.max_edge)
    };

    let (width, height) = preview.dimensions();
    Ok(ThumbnailImage {
        bytes: encode_jpeg(&preview, options.jpeg_quality)?,
        width,
        height,
    })
}

/// Baseline JPEG of `image`; alpha is dropped since JPEG has none.
pub(crate) fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&DynamicImage::ImageRgb8(image.to_rgb8()))
        .map_err(|error| Error::ImageEncode(error.to_string()))?;
    Ok(out.into_inner())
}
