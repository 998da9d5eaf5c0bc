//! Client-side image compression to a byte budget.
//!
//! Re-encoded size is assumed to scale with pixel area, so an image that is
//! `k` times over budget is scaled by `sqrt(1 / k)` along each axis and
//! re-encoded once as JPEG. The output is not re-checked against the budget.

use image::{imageops::FilterType, GenericImageView};

use crate::config::{ComposerConfig, DEFAULT_COMPRESSION_BUDGET_BYTES, DEFAULT_JPEG_QUALITY};
use crate::media::thumbnail::encode_jpeg;
use crate::models::Attachment;
use crate::{Error, Result};

/// MIME type of every compressed output.
pub const COMPRESSED_MIME_TYPE: &str = "image/jpeg";

/// Downscales oversized images to roughly fit a byte budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCompressor {
    budget_bytes: u64,
    jpeg_quality: u8,
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self {
            budget_bytes: DEFAULT_COMPRESSION_BUDGET_BYTES,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ImageCompressor {
    pub fn new(budget_bytes: u64, jpeg_quality: u8) -> Result<Self> {
        if budget_bytes == 0 {
            return Err(Error::InvalidInput(
                "Compression budget must be greater than zero".to_string(),
            ));
        }
        if !(1..=100).contains(&jpeg_quality) {
            return Err(Error::InvalidInput(format!(
                "JPEG quality must be between 1 and 100 (got {jpeg_quality})"
            )));
        }
        Ok(Self {
            budget_bytes,
            jpeg_quality,
        })
    }

    pub fn from_config(config: &ComposerConfig) -> Result<Self> {
        Self::new(config.compression_budget_bytes, config.jpeg_quality)
    }

    pub const fn budget_bytes(&self) -> u64 {
        self.budget_bytes
    }

    /// Whether `attachment` is small enough to skip compression.
    pub fn within_budget(&self, attachment: &Attachment) -> bool {
        attachment.byte_size() <= self.budget_bytes
    }

    /// Compress an attachment, or hand it back untouched when within budget.
    ///
    /// Decoding, scaling and encoding run on the blocking pool; the decoded
    /// bitmap and scaled surface are dropped there on every path.
    pub async fn compress(&self, attachment: Attachment) -> Result<Attachment> {
        if self.within_budget(&attachment) {
            tracing::debug!(
                file = %attachment.name(),
                byte_size = attachment.byte_size(),
                "Attachment within compression budget"
            );
            return Ok(attachment);
        }

        let compressor = *self;
        tokio::task::spawn_blocking(move || compressor.compress_blocking(&attachment))
            .await
            .map_err(|error| Error::ImageDecode(format!("Compression task failed: {error}")))?
    }

    fn compress_blocking(&self, attachment: &Attachment) -> Result<Attachment> {
        let source = image::load_from_memory(attachment.bytes())
            .map_err(|error| Error::ImageDecode(format!("{}: {error}", attachment.name())))?;

        let (source_width, source_height) = source.dimensions();
        let (width, height) = scaled_dimensions(
            source_width,
            source_height,
            attachment.byte_size(),
            self.budget_bytes,
        );
        if width == 0 || height == 0 {
            return Err(Error::EmptyScaledImage { width, height });
        }

        let scaled = source.resize_exact(width, height, FilterType::Triangle);
        drop(source);
        let bytes = encode_jpeg(&scaled, self.jpeg_quality)?;

        tracing::debug!(
            file = %attachment.name(),
            from = attachment.byte_size(),
            to = bytes.len(),
            width,
            height,
            "Compressed image attachment"
        );

        Ok(Attachment::from_parts(
            attachment.name(),
            COMPRESSED_MIME_TYPE,
            bytes,
        ))
    }
}

/// Output dimensions for an image of `byte_size` bytes squeezed into `budget`.
///
/// Both axes use the same factor `sqrt(budget / byte_size)` and are floored,
/// which can yield zero for extreme ratios.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn scaled_dimensions(width: u32, height: u32, byte_size: u64, budget: u64) -> (u32, u32) {
    if byte_size <= budget {
        return (width, height);
    }
    let scale = (budget as f64 / byte_size as f64).sqrt();
    let width = (f64::from(width) * scale).floor() as u32;
    let height = (f64::from(height) * scale).floor() as u32;
    (width, height)
}
