use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] composer_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "No destination configured. Pass --server and --room, set COMPOSER_SERVER_URL and COMPOSER_ROOM_ID, or run `composer config init`."
    )]
    MissingDestination,
    #[error("Nothing to send: provide --text or at least one file")]
    EmptySubmission,
    #[error("Only image files can be attached; nothing was sent")]
    AttachmentRejected,
    #[error("{failed} of {total} submitted items failed")]
    SubmissionFailed { failed: usize, total: usize },
}
