//! Data models for the composer

mod attachment;
mod message_id;

pub use attachment::{Attachment, CandidateFile, FileSource};
pub use message_id::ClientMessageId;
