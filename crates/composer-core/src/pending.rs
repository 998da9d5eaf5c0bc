//! Pending message content and upload progress.
//!
//! A pending message is the optimistic entry shown in the message list until
//! the server confirms or rejects it.

use std::sync::atomic::{AtomicU8, Ordering};

use askama::Template;

use crate::Result;

/// Body of an optimistic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingContent {
    /// A text message as typed.
    Text(String),
    /// A file upload placeholder.
    Upload(UploadProgress),
}

impl PendingContent {
    /// Markup for hosts that render HTML. Text is escaped.
    pub fn to_html(&self) -> Result<String> {
        match self {
            Self::Text(body) => Ok(PendingTextTemplate { body }.render()?),
            Self::Upload(progress) => progress.to_html(),
        }
    }
}

/// Transient state of one in-flight upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub filename: String,
    /// 0..=100
    pub percent: u8,
}

impl UploadProgress {
    pub fn new(filename: impl Into<String>, percent: u8) -> Self {
        Self {
            filename: filename.into(),
            percent: percent.min(100),
        }
    }

    pub fn to_html(&self) -> Result<String> {
        pending_upload_markup(&self.filename, self.percent)
    }
}

#[derive(Template)]
#[template(
    source = r#"<div class="message__pending-upload flex align-center gap" style="--percentage: {{ percent }}%">
  <div class="composer__file-thumbnail composer__file-thumbnail--common colorize--black borderless flex-item-no-shrink"></div>
  <div>{{ filename }} - <span>{{ percent }}%</span></div>
</div>"#,
    ext = "html"
)]
struct PendingUploadTemplate<'a> {
    filename: &'a str,
    percent: u8,
}

#[derive(Template)]
#[template(
    source = r#"<div class="message__body-content">{{ body }}</div>"#,
    ext = "html"
)]
struct PendingTextTemplate<'a> {
    body: &'a str,
}

/// Placeholder body shown while `filename` uploads.
pub fn pending_upload_markup(filename: &str, percent: u8) -> Result<String> {
    Ok(PendingUploadTemplate {
        filename,
        percent: percent.min(100),
    }
    .render()?)
}

/// Keeps reported upload progress within 0..=100 and never moving backwards.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    last: AtomicU8,
}

impl ProgressTracker {
    pub const fn new() -> Self {
        Self {
            last: AtomicU8::new(0),
        }
    }

    /// Record a reported value.
    ///
    /// Returns the new percentage when it advanced, `None` for stale or
    /// repeated reports.
    pub fn advance(&self, percent: u8) -> Option<u8> {
        let percent = percent.min(100);
        let previous = self.last.fetch_max(percent, Ordering::SeqCst);
        (percent > previous).then_some(percent)
    }

    pub fn current(&self) -> u8 {
        self.last.load(Ordering::SeqCst)
    }
}

/// Integer percentage of `done` out of `total`; an empty total counts as done.
pub fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = done.min(total).saturating_mul(100) / total;
    u8::try_from(percent).unwrap_or(100)
}
