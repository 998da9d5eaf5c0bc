//! Staging list of attachments awaiting submission.
//!
//! Entries are kept sorted by file name, so the display index of an entry is
//! its position in the list. Any mutation re-sorts before the next lookup;
//! indices from an earlier render must not be reused.

use std::cmp::Ordering;

use askama::Template;

use crate::media::thumbnail::{generate_thumbnail, ThumbnailOptions};
use crate::models::Attachment;
use crate::Result;

/// Icon shown for a staged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePreview {
    /// Inline JPEG thumbnail as a `data:` URI.
    Thumbnail { data_uri: String },
    /// Generic file glyph.
    Generic,
}

#[derive(Debug, Clone)]
struct StagedFile {
    attachment: Attachment,
    preview: FilePreview,
}

/// One row of the rendered file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListEntry {
    pub index: usize,
    pub basename: String,
    pub extension: String,
    pub preview: FilePreview,
}

impl FileListEntry {
    pub fn thumbnail_src(&self) -> Option<&str> {
        match &self.preview {
            FilePreview::Thumbnail { data_uri } => Some(data_uri),
            FilePreview::Generic => None,
        }
    }

    /// Caption text as displayed: `basename.` followed by `extension`.
    pub fn caption(&self) -> String {
        if self.extension.is_empty() {
            self.basename.clone()
        } else {
            format!("{}.{}", self.basename, self.extension)
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"{% for entry in entries %}<button type="button" style="gap: 0" data-action="composer#fileUnpicked" data-composer-index-param="{{ entry.index }}" class="btn btn--plain composer__file txt-normal position-relative unpad flex-column">
{%- if let Some(src) = entry.thumbnail_src() %}<img role="presentation" class="flex-item-no-shrink composer__file-thumbnail" src="{{ src }}">{% else %}<span class="composer__file-thumbnail composer__file-thumbnail--common colorize--black"></span>{% endif -%}
<span class="pad-inline txt-small flex align-center max-width composer__file-caption">
{%- if entry.extension.is_empty() %}<span class="overflow-ellipsis">{{ entry.basename }}</span>{% else %}<span class="overflow-ellipsis">{{ entry.basename }}.</span><span class="flex-item-no-shrink">{{ entry.extension }}</span>{% endif -%}
</span></button>
{% endfor %}"#,
    ext = "html"
)]
struct FileListTemplate<'a> {
    entries: &'a [FileListEntry],
}

/// Ordered collection of validated attachments the user has queued.
#[derive(Debug, Clone, Default)]
pub struct StagingList {
    files: Vec<StagedFile>,
    thumbnail_options: ThumbnailOptions,
}

impl StagingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thumbnail_size(max_edge: u32) -> Self {
        Self {
            files: Vec::new(),
            thumbnail_options: ThumbnailOptions {
                max_edge,
                ..ThumbnailOptions::default()
            },
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Stage an attachment and compute its preview.
    pub fn add(&mut self, attachment: Attachment) {
        let preview = self.preview_for(&attachment);
        tracing::debug!(file = %attachment.name(), "Staged attachment");
        self.files.push(StagedFile {
            attachment,
            preview,
        });
        self.sort();
    }

    /// Remove the entry at `display_index` of the current sorted order.
    pub fn remove_at(&mut self, display_index: usize) -> Option<Attachment> {
        self.sort();
        if display_index >= self.files.len() {
            tracing::debug!(display_index, len = self.files.len(), "Unpick index out of range");
            return None;
        }
        let removed = self.files.remove(display_index).attachment;
        tracing::debug!(file = %removed.name(), display_index, "Unstaged attachment");
        Some(removed)
    }

    /// Empty the list, handing back every attachment in display order.
    pub fn drain_all(&mut self) -> Vec<Attachment> {
        self.sort();
        self.files.drain(..).map(|file| file.attachment).collect()
    }

    /// Attachments in display order.
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.files.iter().map(|file| &file.attachment)
    }

    /// Display projection of the list.
    pub fn render(&self) -> Vec<FileListEntry> {
        self.files
            .iter()
            .enumerate()
            .map(|(index, file)| {
                let (basename, extension) = split_filename(file.attachment.name());
                FileListEntry {
                    index,
                    basename: basename.to_string(),
                    extension: extension.to_string(),
                    preview: file.preview.clone(),
                }
            })
            .collect()
    }

    /// File list markup with every user-supplied string escaped.
    pub fn render_html(&self) -> Result<String> {
        let entries = self.render();
        Ok(FileListTemplate { entries: &entries }.render()?)
    }

    fn preview_for(&self, attachment: &Attachment) -> FilePreview {
        if !attachment.is_image() {
            return FilePreview::Generic;
        }
        match generate_thumbnail(attachment.bytes(), self.thumbnail_options) {
            Ok(thumbnail) => FilePreview::Thumbnail {
                data_uri: thumbnail.data_uri(),
            },
            Err(error) => {
                tracing::debug!(file = %attachment.name(), "No thumbnail preview: {error}");
                FilePreview::Generic
            }
        }
    }

    fn sort(&mut self) {
        self.files
            .sort_by(|a, b| compare_names(a.attachment.name(), b.attachment.name()));
    }
}

/// Name order used for display: case-insensitive first, then byte order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Split a file name at its final `.` into basename and extension.
///
/// A name without a dot is all basename.
pub fn split_filename(name: &str) -> (&str, &str) {
    name.rsplit_once('.').unwrap_or((name, ""))
}
