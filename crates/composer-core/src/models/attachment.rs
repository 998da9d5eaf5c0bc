//! Attachment model

use std::fmt;

/// Where a candidate file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileSource {
    /// File chooser dialog.
    Picker,
    /// Clipboard paste.
    Clipboard,
    /// Drag and drop payload.
    Drop,
}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Picker => "picker",
            Self::Clipboard => "clipboard",
            Self::Drop => "drop",
        };
        f.write_str(label)
    }
}

/// A raw file descriptor handed over by a picker, clipboard or drop source.
///
/// Nothing about it has been checked yet; it becomes an [`Attachment`] only
/// after passing [`crate::validator::validate`].
#[derive(Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// File name as reported by the source.
    pub name: String,
    /// Content MIME type as reported by the source.
    pub mime_type: String,
    /// File content.
    pub bytes: Vec<u8>,
    /// Origin of the file.
    pub source: FileSource,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
        source: FileSource,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
            source,
        }
    }
}

impl fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("byte_size", &self.bytes.len())
            .field("source", &self.source)
            .finish()
    }
}

/// A validated, immutable file queued for submission.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl Attachment {
    /// Only the validator and the compressor mint attachments.
    pub(crate) fn from_parts(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Attachment size in bytes.
    pub fn byte_size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("byte_size", &self.bytes.len())
            .finish()
    }
}
