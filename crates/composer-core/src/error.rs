//! Error types for composer-core

use thiserror::Error;

use crate::submission::Submission;

/// Result type alias using composer-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in composer-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Candidate file is not an image
    #[error("Unsupported attachment type: {mime_type:?}")]
    UnsupportedAttachmentType { mime_type: String },

    /// Image bytes could not be decoded
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    /// Scaling collapsed one of the output dimensions to zero
    #[error("Scaled image would be empty ({width}x{height})")]
    EmptyScaledImage { width: u32, height: u32 },

    /// Re-encoding the scaled image failed
    #[error("Failed to encode image: {0}")]
    ImageEncode(String),

    /// The text form submission was rejected
    #[error("Message submission failed: {0}")]
    Submission(String),

    /// A file upload failed
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Another submission is still running; carries the refused submission
    #[error("A submission is already in flight")]
    SubmissionInFlight(Box<Submission>),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Markup rendering error
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl Error {
    /// The submission refused by a busy coordinator, for handing back to the
    /// composer.
    pub fn into_refused_submission(self) -> Option<Submission> {
        match self {
            Self::SubmissionInFlight(submission) => Some(*submission),
            _ => None,
        }
    }

    /// Whether this error belongs to the image decode failure class.
    pub const fn is_image_failure(&self) -> bool {
        matches!(
            self,
            Self::ImageDecode(_) | Self::EmptyScaledImage { .. } | Self::ImageEncode(_)
        )
    }
}
