//! Attachment validation.
//!
//! Only images may be attached. A rejected candidate never becomes an
//! [`Attachment`], so nothing downstream has to re-check the type.

use crate::models::{Attachment, CandidateFile};
use crate::{Error, Result};

/// User-facing notice shown when a candidate is rejected.
pub const REJECTION_NOTICE: &str =
    "Only image files are allowed. Videos and documents are not permitted.";

const IMAGE_MIME_PREFIX: &str = "image/";

/// Accept a candidate iff its MIME type starts with `image/`.
///
/// Empty or malformed MIME types are treated as non-images.
pub fn validate(candidate: CandidateFile) -> Result<Attachment> {
    if !candidate.mime_type.starts_with(IMAGE_MIME_PREFIX) {
        tracing::warn!(
            file = %candidate.name,
            mime_type = %candidate.mime_type,
            source = %candidate.source,
            "Rejected non-image attachment"
        );
        return Err(Error::UnsupportedAttachmentType {
            mime_type: candidate.mime_type,
        });
    }

    Ok(Attachment::from_parts(
        candidate.name,
        candidate.mime_type,
        candidate.bytes,
    ))
}

/// Result of validating one pick, paste or drop batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Candidates accepted before the batch stopped.
    pub accepted: Vec<Attachment>,
    /// The candidate that stopped the batch, if any.
    pub rejected: Option<Error>,
}

impl BatchOutcome {
    pub const fn was_rejected(&self) -> bool {
        self.rejected.is_some()
    }
}

/// Validate a batch in order, stopping at the first rejected candidate.
///
/// Candidates after the rejected one are discarded unchecked.
pub fn accept_batch(candidates: impl IntoIterator<Item = CandidateFile>) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for candidate in candidates {
        match validate(candidate) {
            Ok(attachment) => outcome.accepted.push(attachment),
            Err(error) => {
                outcome.rejected = Some(error);
                break;
            }
        }
    }
    outcome
}
