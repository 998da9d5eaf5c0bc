use std::fs;
use std::path::{Path, PathBuf};

use composer_core::media::{ImageCompressor, COMPRESSED_MIME_TYPE};
use composer_core::validator::validate;
use composer_core::ComposerConfig;

use crate::commands::common::{format_bytes, read_candidate};
use crate::error::CliError;

pub async fn run_compress(
    config: &ComposerConfig,
    input: &Path,
    output: Option<&Path>,
    budget: Option<u64>,
    quality: Option<u8>,
) -> Result<(), CliError> {
    let attachment = validate(read_candidate(input)?)?;
    let compressor = ImageCompressor::new(
        budget.unwrap_or(config.compression_budget_bytes),
        quality.unwrap_or(config.jpeg_quality),
    )?;

    let original_size = attachment.byte_size();
    if compressor.within_budget(&attachment) {
        println!(
            "{} is already within {}",
            input.display(),
            format_bytes(compressor.budget_bytes())
        );
    }
    let compressed = compressor.compress(attachment).await?;

    let output = output.map_or_else(
        || default_output_path(input, compressed.mime_type()),
        Path::to_path_buf,
    );
    fs::write(&output, compressed.bytes())?;

    println!(
        "{} -> {} ({} -> {})",
        input.display(),
        output.display(),
        format_bytes(original_size),
        format_bytes(compressed.byte_size())
    );
    Ok(())
}

/// `<stem>.compressed.<ext>` next to the input; `jpg` once re-encoded.
pub fn default_output_path(input: &Path, mime_type: &str) -> PathBuf {
    let stem = input.file_stem().map_or_else(
        || "attachment".to_string(),
        |stem| stem.to_string_lossy().into_owned(),
    );
    let extension = if mime_type == COMPRESSED_MIME_TYPE {
        "jpg".to_string()
    } else {
        input.extension().map_or_else(
            || "bin".to_string(),
            |extension| extension.to_string_lossy().into_owned(),
        )
    };
    input.with_file_name(format!("{stem}.compressed.{extension}"))
}
