//! Composer state: text field, staged files and toolbar.
//!
//! Hosts feed user actions (pick, paste, drop, unpick, key presses) into a
//! [`Composer`]. A submit drains it into a [`Submission`] that a
//! [`crate::SubmissionCoordinator`] carries out, so the composer accepts new
//! input while uploads are still running.

use crate::config::ComposerConfig;
use crate::models::{Attachment, CandidateFile};
use crate::staging::StagingList;
use crate::submission::Notifier;
use crate::util::is_blank;
use crate::validator::{accept_batch, REJECTION_NOTICE};
use crate::Result;

pub use crate::submission::Submission;

/// Keys the composer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

/// A key press in the text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    /// An input method composition is in progress.
    pub is_composing: bool,
}

impl KeyPress {
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            meta: false,
            ctrl: false,
            shift: false,
            is_composing: false,
        }
    }
}

/// The message composer of one room.
#[derive(Debug)]
pub struct Composer<N> {
    text: String,
    undo_stack: Vec<String>,
    staging: StagingList,
    toolbar_visible: bool,
    fields_disabled: bool,
    touch_device: bool,
    notifier: N,
}

impl<N: Notifier> Composer<N> {
    pub fn new(notifier: N) -> Self {
        Self::with_config(notifier, &ComposerConfig::default())
    }

    pub fn with_config(notifier: N, config: &ComposerConfig) -> Self {
        Self {
            text: String::new(),
            undo_stack: Vec::new(),
            staging: StagingList::with_thumbnail_size(config.thumbnail_size),
            toolbar_visible: false,
            fields_disabled: false,
            touch_device: false,
            notifier,
        }
    }

    /// Touch devices submit through the button only.
    #[must_use]
    pub const fn on_touch_device(mut self, touch_device: bool) -> Self {
        self.touch_device = touch_device;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Replace the whole message, keeping the previous text for [`Self::undo`].
    pub fn replace_message_content(&mut self, content: impl Into<String>) {
        let previous = std::mem::replace(&mut self.text, content.into());
        self.undo_stack.push(previous);
    }

    /// Restore the text replaced by the last [`Self::replace_message_content`].
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                self.text = previous;
                true
            }
            None => false,
        }
    }

    pub const fn staging(&self) -> &StagingList {
        &self.staging
    }

    pub fn file_list_html(&self) -> Result<String> {
        self.staging.render_html()
    }

    /// Files chosen in the file picker. Returns how many were staged.
    pub fn file_picked(&mut self, candidates: Vec<CandidateFile>) -> usize {
        self.stage_batch(candidates)
    }

    /// Files pasted from the clipboard.
    ///
    /// Returns whether the paste carried files, in which case the host should
    /// suppress its default paste handling.
    pub fn paste_files(&mut self, candidates: Vec<CandidateFile>) -> bool {
        let carried_files = !candidates.is_empty();
        self.stage_batch(candidates);
        carried_files
    }

    /// Files dropped onto the composer. Returns how many were staged.
    pub fn drop_files(&mut self, candidates: Vec<CandidateFile>) -> usize {
        self.stage_batch(candidates)
    }

    /// Unstage the file at `display_index` of the current file list.
    pub fn file_unpicked(&mut self, display_index: usize) -> Option<Attachment> {
        self.staging.remove_at(display_index)
    }

    /// Drain the composer for submission.
    ///
    /// Returns `None` while the fields are disabled or when there is nothing
    /// to send. The toolbar is collapsed; the text field is cleared only when
    /// its text is sent.
    pub fn submit(&mut self) -> Option<Submission> {
        if self.fields_disabled {
            tracing::debug!("Ignoring submit while offline");
            return None;
        }

        let mut submission = Submission {
            text: std::mem::take(&mut self.text),
            files: self.staging.drain_all(),
        };
        self.collapse_toolbar();

        if !submission.has_text() {
            // Whitespace-only text stays in the field.
            self.text = std::mem::take(&mut submission.text);
        }
        if submission.is_empty() {
            return None;
        }
        if !submission.has_text() {
            tracing::debug!(files = submission.files.len(), "Submitting files only");
        }
        Some(submission)
    }

    /// Put back a submission that could not start.
    ///
    /// Its text goes in front of anything typed since, and its files are
    /// staged again.
    pub fn restore(&mut self, submission: Submission) {
        let Submission { text, files } = submission;
        if !is_blank(&text) {
            self.text = if is_blank(&self.text) {
                text
            } else {
                format!("{text}\n{}", self.text)
            };
        }
        for attachment in files {
            self.staging.add(attachment);
        }
    }

    /// Whether a key press in the text field should submit.
    ///
    /// Meta/Ctrl+Enter always submits. A plain Enter (no Shift, no active
    /// composition) submits only while the toolbar is hidden.
    pub const fn should_submit_on_key(&self, press: KeyPress) -> bool {
        if self.touch_device || !matches!(press.key, Key::Enter) {
            return false;
        }
        let meta_enter = press.meta || press.ctrl;
        let plain_enter = !press.shift && !press.is_composing;
        meta_enter || (plain_enter && !self.toolbar_visible)
    }

    pub fn toggle_toolbar(&mut self) {
        self.toolbar_visible = !self.toolbar_visible;
    }

    pub fn collapse_toolbar(&mut self) {
        self.toolbar_visible = false;
    }

    pub const fn is_toolbar_visible(&self) -> bool {
        self.toolbar_visible
    }

    /// Connection restored: fields accept submits again.
    pub fn online(&mut self) {
        self.fields_disabled = false;
    }

    /// Connection lost: submits are ignored until [`Self::online`].
    pub fn offline(&mut self) {
        self.fields_disabled = true;
    }

    pub const fn is_enabled(&self) -> bool {
        !self.fields_disabled
    }

    /// Files embedded inline in the rich-text body are never accepted; they
    /// must go through the staging list.
    pub const fn accepts_inline_attachment(&self) -> bool {
        false
    }

    fn stage_batch(&mut self, candidates: Vec<CandidateFile>) -> usize {
        let outcome = accept_batch(candidates);
        let staged = outcome.accepted.len();
        for attachment in outcome.accepted {
            self.staging.add(attachment);
        }
        if outcome.rejected.is_some() {
            self.notifier.notify(REJECTION_NOTICE);
        }
        staged
    }
}
