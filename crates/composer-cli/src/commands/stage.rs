use std::path::PathBuf;

use composer_core::staging::{FileListEntry, FilePreview};
use composer_core::{Composer, ComposerConfig};

use crate::commands::common::read_candidates;
use crate::error::CliError;
use crate::terminal::TerminalNotifier;

pub fn run_stage(config: &ComposerConfig, files: &[PathBuf], html: bool) -> Result<(), CliError> {
    let mut composer = Composer::with_config(TerminalNotifier, config);
    let staged = composer.file_picked(read_candidates(files)?);

    if html {
        print!("{}", composer.file_list_html()?);
    } else {
        for line in format_file_list(&composer.staging().render()) {
            println!("{line}");
        }
    }

    if staged < files.len() {
        eprintln!("Staged {staged} of {} files", files.len());
    }
    Ok(())
}

pub fn format_file_list(entries: &[FileListEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let preview = match entry.preview {
                FilePreview::Thumbnail { .. } => "thumbnail",
                FilePreview::Generic => "file",
            };
            format!("{:>3}  {preview:<9}  {}", entry.index, entry.caption())
        })
        .collect()
}
