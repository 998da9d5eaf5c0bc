//! composer-core - Core library for the chat message composer
//!
//! This crate contains the attachment model, validation, staging, client-side
//! image compression and the submission flow used by composer hosts (CLI,
//! embedded UIs).

pub mod composer;
pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod pending;
pub mod staging;
pub mod submission;
pub mod util;
pub mod validator;

pub use composer::{Composer, Key, KeyPress, Submission};
pub use config::ComposerConfig;
pub use error::{Error, Result};
pub use models::{Attachment, CandidateFile, ClientMessageId, FileSource};
pub use staging::StagingList;
pub use submission::SubmissionCoordinator;
