use std::path::PathBuf;

use composer_core::media::{HttpComposerClient, ImageCompressor};
use composer_core::submission::{SubmissionReport, TextOutcome};
use composer_core::util::normalize_text_option;
use composer_core::{Composer, ComposerConfig, SubmissionCoordinator};

use crate::commands::common::read_candidates;
use crate::error::CliError;
use crate::terminal::{TerminalDisplay, TerminalNotifier};

pub struct SendOptions {
    pub text: Option<String>,
    pub files: Vec<PathBuf>,
    pub server: Option<String>,
    pub room: Option<u64>,
    pub csrf_token: Option<String>,
}

pub async fn run_send(mut config: ComposerConfig, options: SendOptions) -> Result<(), CliError> {
    let SendOptions {
        text,
        files,
        server,
        room,
        csrf_token,
    } = options;

    apply_destination_overrides(&mut config, server, room);
    config.validate()?;
    let messages_url = config.messages_url().ok_or(CliError::MissingDestination)?;

    let mut composer = Composer::with_config(TerminalNotifier, &config);
    if let Some(text) = text {
        composer.set_text(text);
    }
    if composer.file_picked(read_candidates(&files)?) < files.len() {
        return Err(CliError::AttachmentRejected);
    }
    let submission = composer.submit().ok_or(CliError::EmptySubmission)?;

    let mut client = HttpComposerClient::new(messages_url.as_str())?;
    if let Some(token) = normalize_text_option(csrf_token) {
        client = client.with_csrf_token(token);
    }
    let coordinator = SubmissionCoordinator::new(
        TerminalDisplay::default(),
        client.clone(),
        client,
        TerminalNotifier,
        ImageCompressor::from_config(&config)?,
        messages_url,
    );

    let report = coordinator.run(submission).await?;
    ensure_delivered(&report)
}

/// Flags override config and environment.
pub fn apply_destination_overrides(
    config: &mut ComposerConfig,
    server: Option<String>,
    room: Option<u64>,
) {
    if let Some(server) = normalize_text_option(server) {
        config.server_url = Some(server.trim_end_matches('/').to_string());
    }
    if room.is_some() {
        config.room_id = room;
    }
}

pub fn ensure_delivered(report: &SubmissionReport) -> Result<(), CliError> {
    let text_failed = matches!(report.text, Some(TextOutcome::Failed { .. }));
    let failed = usize::from(text_failed)
        + report
            .files
            .iter()
            .filter(|outcome| !outcome.is_success())
            .count();
    if failed == 0 {
        return Ok(());
    }
    Err(CliError::SubmissionFailed {
        failed,
        total: usize::from(report.text.is_some()) + report.files.len(),
    })
}
