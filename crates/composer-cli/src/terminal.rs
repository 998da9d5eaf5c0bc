//! Terminal stand-ins for the page: the notice channel and the pending
//! message list.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use composer_core::pending::PendingContent;
use composer_core::submission::{Notifier, PendingMessages};
use composer_core::util::compact_text;
use composer_core::ClientMessageId;

/// Prints user notices to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        eprintln!("! {message}");
    }
}

/// Pending entries and progress go to stderr, confirmed payloads to stdout.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    labels: Mutex<HashMap<ClientMessageId, String>>,
}

impl TerminalDisplay {
    fn take_label(&self, id: ClientMessageId) -> String {
        self.labels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .unwrap_or_else(|| "message".to_string())
    }
}

#[async_trait]
impl PendingMessages for TerminalDisplay {
    async fn insert_pending_message(&self, id: ClientMessageId, content: PendingContent) {
        let label = match &content {
            PendingContent::Text(_) => "message".to_string(),
            PendingContent::Upload(progress) => progress.filename.clone(),
        };
        self.labels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, label);
        eprintln!("{}", describe_pending(id, &content));
    }

    fn update_pending_message(&self, id: ClientMessageId, content: PendingContent) {
        eprintln!("{}", describe_pending(id, &content));
    }

    fn fail_pending_message(&self, id: ClientMessageId) {
        let label = self.take_label(id);
        eprintln!("[{}] failed: {label}", short_id(id));
    }

    fn render_confirmed(&self, id: ClientMessageId, payload: &str) {
        let label = self.take_label(id);
        eprintln!("[{}] sent: {label}", short_id(id));
        if !payload.trim().is_empty() {
            println!("{payload}");
        }
    }
}

/// One status line for a pending entry.
pub fn describe_pending(id: ClientMessageId, content: &PendingContent) -> String {
    match content {
        PendingContent::Text(body) => format!("[{}] pending: {}", short_id(id), compact_text(body)),
        PendingContent::Upload(progress) => format!(
            "[{}] uploading {} {:>3}%",
            short_id(id),
            progress.filename,
            progress.percent
        ),
    }
}

/// Trailing random part of the id; the leading part is a timestamp.
pub fn short_id(id: ClientMessageId) -> String {
    let mut value = id.to_string();
    value.split_off(value.len().saturating_sub(8))
}
