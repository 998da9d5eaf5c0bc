//! Submission of a composed message and its attachments.
//!
//! A submission has two independent tracks. The text track runs only when the
//! body is non-blank; the file track runs whenever files were staged. Text is
//! staged before files, and files upload strictly one at a time in staging
//! order.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::media::compress::ImageCompressor;
use crate::models::{Attachment, ClientMessageId};
use crate::pending::{PendingContent, ProgressTracker, UploadProgress};
use crate::util::is_blank;
use crate::{Error, Result};

/// Display side of optimistic messages.
#[async_trait]
pub trait PendingMessages: Send + Sync {
    /// Show a new pending entry. Resolves once it is on screen.
    async fn insert_pending_message(&self, id: ClientMessageId, content: PendingContent);

    /// Replace the body of an existing pending entry.
    fn update_pending_message(&self, id: ClientMessageId, content: PendingContent);

    /// Mark a pending entry as failed.
    fn fail_pending_message(&self, id: ClientMessageId);

    /// Render server-confirmed content that supersedes a pending entry.
    fn render_confirmed(&self, id: ClientMessageId, payload: &str);
}

/// A single file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub attachment: Attachment,
    /// Form action the file is posted to.
    pub destination: String,
    pub client_message_id: ClientMessageId,
}

/// Moves attachment bytes to the server.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Upload one file, reporting percentages through `on_progress`.
    ///
    /// Returns the server payload that replaces the pending entry.
    async fn upload(
        &self,
        request: UploadRequest,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<String>;
}

/// The text message form as it is posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub client_message_id: ClientMessageId,
    pub body: String,
}

/// Submits the text form.
#[async_trait]
pub trait MessageForm: Send + Sync {
    /// Post the form; `true` when the server accepted it.
    async fn request_submit(&self, message: &OutgoingMessage) -> bool;
}

/// Synchronous user-notice channel.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Everything one submit drained from the composer.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub text: String,
    pub files: Vec<Attachment>,
}

impl Submission {
    pub fn has_text(&self) -> bool {
        !is_blank(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        !self.has_text() && self.files.is_empty()
    }
}

/// Outcome of the text track.
#[derive(Debug)]
pub enum TextOutcome {
    Sent(ClientMessageId),
    Failed { id: ClientMessageId, error: Error },
}

/// Outcome of one file of the file track.
#[derive(Debug)]
pub enum FileOutcome {
    Uploaded { name: String, id: ClientMessageId },
    /// Compression failed; no pending entry was created.
    CompressionFailed { name: String, error: Error },
    UploadFailed {
        name: String,
        id: ClientMessageId,
        error: Error,
    },
}

impl FileOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }
}

/// What happened during one run.
#[derive(Debug, Default)]
pub struct SubmissionReport {
    pub text: Option<TextOutcome>,
    pub files: Vec<FileOutcome>,
}

impl SubmissionReport {
    pub fn is_success(&self) -> bool {
        !matches!(self.text, Some(TextOutcome::Failed { .. }))
            && self.files.iter().all(FileOutcome::is_success)
    }
}

/// Drives a [`Submission`] through the pending display, form and transport.
pub struct SubmissionCoordinator<P, T, F, N> {
    pending: P,
    transport: T,
    form: F,
    notifier: N,
    compressor: ImageCompressor,
    destination: String,
    in_flight: AtomicBool,
}

/// Holds the in-flight latch; releases it when dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(latch: &'a AtomicBool) -> Option<Self> {
        latch
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(latch))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<P, T, F, N> SubmissionCoordinator<P, T, F, N>
where
    P: PendingMessages,
    T: UploadTransport,
    F: MessageForm,
    N: Notifier,
{
    pub fn new(
        pending: P,
        transport: T,
        form: F,
        notifier: N,
        compressor: ImageCompressor,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            pending,
            transport,
            form,
            notifier,
            compressor,
            destination: destination.into(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub const fn pending(&self) -> &P {
        &self.pending
    }

    /// Whether a run currently holds the latch.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run both tracks of a submission.
    ///
    /// Fails with [`Error::SubmissionInFlight`] while another run is active.
    /// The error hands the untouched submission back so the host can return
    /// it to the composer with [`crate::Composer::restore`]; the submit
    /// control should stay disabled meanwhile.
    pub async fn run(&self, submission: Submission) -> Result<SubmissionReport> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::warn!("Rejected re-entrant submission");
            return Err(Error::SubmissionInFlight(Box::new(submission)));
        };

        let Submission { text, files } = submission;
        let mut report = SubmissionReport::default();

        if is_blank(&text) {
            tracing::debug!("Blank text, skipping message track");
        } else {
            report.text = Some(self.submit_text(text).await);
        }

        for attachment in files {
            report.files.push(self.submit_file(attachment).await);
        }

        tracing::info!(
            text = report.text.is_some(),
            files = report.files.len(),
            success = report.is_success(),
            "Submission finished"
        );
        Ok(report)
    }

    /// Mark a text message failed after the form reported failure.
    pub fn submit_end(&self, id: ClientMessageId, success: bool) {
        if !success {
            tracing::warn!(client_message_id = %id, "Message submission failed");
            self.pending.fail_pending_message(id);
        }
    }

    async fn submit_text(&self, body: String) -> TextOutcome {
        let id = ClientMessageId::new();
        self.pending
            .insert_pending_message(id, PendingContent::Text(body.clone()))
            .await;
        // Let the pending entry paint before the form goes out.
        tokio::task::yield_now().await;

        let message = OutgoingMessage {
            client_message_id: id,
            body,
        };
        let success = self.form.request_submit(&message).await;
        self.submit_end(id, success);

        if success {
            tracing::info!(client_message_id = %id, "Message submitted");
            TextOutcome::Sent(id)
        } else {
            TextOutcome::Failed {
                id,
                error: Error::Submission("server rejected the message form".to_string()),
            }
        }
    }

    async fn submit_file(&self, attachment: Attachment) -> FileOutcome {
        let name = attachment.name().to_string();
        let attachment = if attachment.is_image() {
            match self.compressor.compress(attachment).await {
                Ok(compressed) => compressed,
                Err(error) => {
                    tracing::warn!(file = %name, "Skipping attachment: {error}");
                    self.notifier
                        .notify(&format!("Could not process {name}: {error}"));
                    return FileOutcome::CompressionFailed { name, error };
                }
            }
        } else {
            attachment
        };

        let id = ClientMessageId::new();
        self.pending
            .insert_pending_message(id, PendingContent::Upload(UploadProgress::new(&name, 0)))
            .await;

        let tracker = ProgressTracker::new();
        let on_progress = |percent: u8| {
            if let Some(percent) = tracker.advance(percent) {
                self.pending.update_pending_message(
                    id,
                    PendingContent::Upload(UploadProgress::new(&name, percent)),
                );
            }
        };

        let request = UploadRequest {
            attachment,
            destination: self.destination.clone(),
            client_message_id: id,
        };
        match self.transport.upload(request, &on_progress).await {
            Ok(payload) => {
                tracing::info!(client_message_id = %id, file = %name, "Attachment uploaded");
                self.pending.render_confirmed(id, &payload);
                FileOutcome::Uploaded { name, id }
            }
            Err(error) => {
                tracing::warn!(client_message_id = %id, file = %name, "Upload failed: {error}");
                self.pending.fail_pending_message(id);
                FileOutcome::UploadFailed { name, id, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::Composer;
    use crate::models::{CandidateFile, FileSource};
    use crate::validator::validate;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Insert(ClientMessageId, PendingContent),
        Update(ClientMessageId, u8),
        Fail(ClientMessageId),
        Confirmed(ClientMessageId, String),
        Form(String),
        Upload(String),
        Notice(String),
    }

    #[derive(Default)]
    struct Log(Mutex<Vec<Event>>);

    impl Log {
        fn push(&self, event: Event) {
            self.0.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<Event> {
            self.0.lock().unwrap().clone()
        }
    }

    struct FakePending<'a>(&'a Log);

    #[async_trait]
    impl<'a> PendingMessages for FakePending<'a> {
        async fn insert_pending_message(&self, id: ClientMessageId, content: PendingContent) {
            self.0.push(Event::Insert(id, content));
        }

        fn update_pending_message(&self, id: ClientMessageId, content: PendingContent) {
            if let PendingContent::Upload(progress) = content {
                self.0.push(Event::Update(id, progress.percent));
            }
        }

        fn fail_pending_message(&self, id: ClientMessageId) {
            self.0.push(Event::Fail(id));
        }

        fn render_confirmed(&self, id: ClientMessageId, payload: &str) {
            self.0.push(Event::Confirmed(id, payload.to_string()));
        }
    }

    struct FakeTransport<'a> {
        log: &'a Log,
        failing: HashSet<String>,
    }

    #[async_trait]
    impl<'a> UploadTransport for FakeTransport<'a> {
        async fn upload(
            &self,
            request: UploadRequest,
            on_progress: &(dyn Fn(u8) + Send + Sync),
        ) -> Result<String> {
            let name = request.attachment.name().to_string();
            self.log.push(Event::Upload(name.clone()));
            on_progress(40);
            on_progress(30);
            if self.failing.contains(&name) {
                return Err(Error::Upload(format!("{name} refused")));
            }
            on_progress(100);
            Ok(format!("<turbo-stream>{name}</turbo-stream>"))
        }
    }

    struct FakeForm<'a> {
        log: &'a Log,
        accept: bool,
    }

    #[async_trait]
    impl<'a> MessageForm for FakeForm<'a> {
        async fn request_submit(&self, message: &OutgoingMessage) -> bool {
            self.log.push(Event::Form(message.body.clone()));
            self.accept
        }
    }

    struct FakeNotifier<'a>(&'a Log);

    impl Notifier for FakeNotifier<'_> {
        fn notify(&self, message: &str) {
            self.0.push(Event::Notice(message.to_string()));
        }
    }

    fn coordinator<'a>(
        log: &'a Log,
        accept_form: bool,
        failing: &[&str],
    ) -> SubmissionCoordinator<FakePending<'a>, FakeTransport<'a>, FakeForm<'a>, FakeNotifier<'a>>
    {
        SubmissionCoordinator::new(
            FakePending(log),
            FakeTransport {
                log,
                failing: failing.iter().map(ToString::to_string).collect(),
            },
            FakeForm {
                log,
                accept: accept_form,
            },
            FakeNotifier(log),
            ImageCompressor::default(),
            "https://chat.example.com/rooms/1/messages",
        )
    }

    fn image(name: &str) -> Attachment {
        validate(CandidateFile::new(
            name,
            "image/png",
            vec![0; 16],
            FileSource::Picker,
        ))
        .unwrap()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blank_text_skips_message_but_uploads_files() {
        let log = Log::default();
        let report = coordinator(&log, true, &[])
            .run(Submission {
                text: "  \n ".to_string(),
                files: vec![image("a.png")],
            })
            .await
            .unwrap();

        assert!(report.text.is_none());
        assert!(report.is_success());
        let events = log.events();
        assert!(!events.iter().any(|e| matches!(e, Event::Form(_))));
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::Insert(_, PendingContent::Text(_)))));
        assert!(events.contains(&Event::Upload("a.png".to_string())));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn text_is_staged_before_files_and_uploads_are_sequential() {
        let log = Log::default();
        let report = coordinator(&log, true, &[])
            .run(Submission {
                text: "hello".to_string(),
                files: vec![image("a.png"), image("b.png")],
            })
            .await
            .unwrap();

        let Some(TextOutcome::Sent(text_id)) = report.text else {
            panic!("text should have been sent");
        };
        let ids: Vec<ClientMessageId> = report
            .files
            .iter()
            .map(|outcome| match outcome {
                FileOutcome::Uploaded { id, .. } => *id,
                other => panic!("unexpected outcome: {other:?}"),
            })
            .collect();

        let expected = vec![
            Event::Insert(text_id, PendingContent::Text("hello".to_string())),
            Event::Form("hello".to_string()),
            Event::Insert(ids[0], PendingContent::Upload(UploadProgress::new("a.png", 0))),
            Event::Upload("a.png".to_string()),
            Event::Update(ids[0], 40),
            Event::Update(ids[0], 100),
            Event::Confirmed(ids[0], "<turbo-stream>a.png</turbo-stream>".to_string()),
            Event::Insert(ids[1], PendingContent::Upload(UploadProgress::new("b.png", 0))),
            Event::Upload("b.png".to_string()),
            Event::Update(ids[1], 40),
            Event::Update(ids[1], 100),
            Event::Confirmed(ids[1], "<turbo-stream>b.png</turbo-stream>".to_string()),
        ];
        assert_eq!(log.events(), expected);
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn rejected_form_marks_text_pending_failed() {
        let log = Log::default();
        let report = coordinator(&log, false, &[])
            .run(Submission {
                text: "hello".to_string(),
                files: Vec::new(),
            })
            .await
            .unwrap();

        let Some(TextOutcome::Failed { id, error }) = &report.text else {
            panic!("text should have failed");
        };
        assert!(matches!(error, Error::Submission(_)));
        assert_eq!(log.events().last(), Some(&Event::Fail(*id)));
        assert!(!report.is_success());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn second_upload_failure_keeps_first_confirmed() {
        let log = Log::default();
        let report = coordinator(&log, true, &["b.png"])
            .run(Submission {
                text: String::new(),
                files: vec![image("a.png"), image("b.png")],
            })
            .await
            .unwrap();

        assert!(report.files[0].is_success());
        let FileOutcome::UploadFailed { id, .. } = &report.files[1] else {
            panic!("second upload should fail");
        };
        let events = log.events();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::Confirmed(_, payload) if payload.contains("a.png"))));
        assert_eq!(events.last(), Some(&Event::Fail(*id)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn undecodable_oversized_image_is_reported_and_skipped() {
        let log = Log::default();
        let mut coordinator = coordinator(&log, true, &[]);
        coordinator.compressor = ImageCompressor::new(4, 85).unwrap();

        let report = coordinator
            .run(Submission {
                text: String::new(),
                files: vec![image("broken.png"), image("c.png")],
            })
            .await
            .unwrap();

        assert!(matches!(
            &report.files[0],
            FileOutcome::CompressionFailed { name, error }
                if name == "broken.png" && error.is_image_failure()
        ));
        let events = log.events();
        assert!(matches!(&events[0], Event::Notice(message) if message.contains("broken.png")));
        assert!(!events.contains(&Event::Upload("broken.png".to_string())));
        assert!(matches!(&report.files[1], FileOutcome::CompressionFailed { .. }));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn latch_rejects_overlapping_runs_and_releases() {
        let log = Log::default();
        let coordinator = coordinator(&log, true, &[]);

        let guard = InFlightGuard::acquire(&coordinator.in_flight).unwrap();
        assert!(coordinator.is_in_flight());
        let err = coordinator.run(Submission::default()).await.unwrap_err();
        assert!(matches!(err, Error::SubmissionInFlight(_)));

        drop(guard);
        assert!(!coordinator.is_in_flight());
        assert!(coordinator.run(Submission::default()).await.is_ok());
        assert!(!coordinator.is_in_flight());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn busy_coordinator_hands_message_and_files_back() {
        let log = Log::default();
        let coordinator = coordinator(&log, true, &[]);
        let mut composer = Composer::new(FakeNotifier(&log));
        composer.set_text("second message");
        composer.file_picked(vec![CandidateFile::new(
            "x.png",
            "image/png",
            vec![0; 16],
            FileSource::Picker,
        )]);

        let guard = InFlightGuard::acquire(&coordinator.in_flight).unwrap();
        let submission = composer.submit().unwrap();
        assert_eq!(composer.text(), "");
        assert!(composer.staging().is_empty());

        let err = coordinator.run(submission).await.unwrap_err();
        let refused = err.into_refused_submission().unwrap();
        composer.restore(refused);
        drop(guard);

        assert_eq!(composer.text(), "second message");
        let staged: Vec<_> = composer.staging().attachments().map(Attachment::name).collect();
        assert_eq!(staged, vec!["x.png"]);
        assert!(log.events().is_empty());

        let report = coordinator.run(composer.submit().unwrap()).await.unwrap();
        assert!(report.is_success());
        assert!(log.events().contains(&Event::Form("second message".to_string())));
        assert!(log.events().contains(&Event::Upload("x.png".to_string())));
    }

    #[test]
    fn submit_end_only_fails_on_error() {
        let log = Log::default();
        let coordinator = coordinator(&log, true, &[]);
        let id = ClientMessageId::new();

        coordinator.submit_end(id, true);
        assert!(log.events().is_empty());
        coordinator.submit_end(id, false);
        assert_eq!(log.events(), vec![Event::Fail(id)]);
    }
}
