//! HTTP transport for message forms and attachment uploads.
//!
//! Talks to the chat server's room message endpoint: text messages are posted
//! as url-encoded forms, attachments as streamed multipart uploads whose
//! progress is reported while the body is handed to the connection.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use reqwest::header::ACCEPT;
use reqwest::{multipart, Body};
use tokio::sync::mpsc;

use crate::pending::percent_of;
use crate::submission::{MessageForm, OutgoingMessage, UploadRequest, UploadTransport};
use crate::util::{compact_text, is_http_url};
use crate::{Error, Result};

/// Accept header asking the server for stream-render payloads.
pub const TURBO_STREAM_ACCEPT: &str = "text/vnd.turbo-stream.html";

const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;
const CSRF_HEADER: &str = "X-CSRF-Token";

const FIELD_BODY: &str = "message[body]";
const FIELD_CLIENT_MESSAGE_ID: &str = "message[client_message_id]";
const FIELD_ATTACHMENT: &str = "message[attachment]";

/// HTTP client bound to one room's message endpoint.
#[derive(Debug, Clone)]
pub struct HttpComposerClient {
    messages_url: String,
    csrf_token: Option<String>,
    client: reqwest::Client,
}

impl HttpComposerClient {
    /// Builds a client for an explicit message endpoint URL.
    pub fn new(messages_url: impl Into<String>) -> Result<Self> {
        let messages_url = normalize_messages_url(messages_url.into().as_str())?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| Error::Config(format!("Failed to construct HTTP client: {error}")))?;
        Ok(Self {
            messages_url,
            csrf_token: None,
            client,
        })
    }

    /// Send `token` as the CSRF header on every request.
    #[must_use]
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Returns the endpoint this client was configured with.
    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }

    /// Posts a text message form.
    pub async fn post_message(&self, message: &OutgoingMessage) -> Result<()> {
        let client_message_id = message.client_message_id.to_string();
        let request = self
            .authorize(self.client.post(&self.messages_url))
            .header(ACCEPT, TURBO_STREAM_ACCEPT)
            .form(&[
                (FIELD_BODY, message.body.as_str()),
                (FIELD_CLIENT_MESSAGE_ID, client_message_id.as_str()),
            ]);

        let response = request
            .send()
            .await
            .map_err(|error| Error::Submission(format!("Message request failed: {error}")))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Submission(format!(
                "Message request failed with HTTP {status}: {}",
                compact_text(&body)
            )));
        }
        Ok(())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.csrf_token {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        }
    }
}

#[async_trait]
impl UploadTransport for HttpComposerClient {
    async fn upload(
        &self,
        request: UploadRequest,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<String> {
        let UploadRequest {
            attachment,
            destination,
            client_message_id,
        } = request;
        let total = attachment.byte_size();
        let file_name = attachment.name().to_string();
        let mime_type = attachment.mime_type().to_string();

        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<u64>();
        let chunks: Vec<Vec<u8>> = attachment
            .bytes()
            .chunks(UPLOAD_CHUNK_BYTES)
            .map(<[u8]>::to_vec)
            .collect();
        drop(attachment);

        let mut sent = 0u64;
        let body = stream::iter(chunks).map(move |chunk| {
            sent = sent.saturating_add(u64::try_from(chunk.len()).unwrap_or(u64::MAX));
            // Receiver is gone once the response arrived.
            let _ = progress_tx.send(sent);
            Ok::<_, std::io::Error>(chunk)
        });

        let part = multipart::Part::stream_with_length(Body::wrap_stream(body), total)
            .file_name(file_name)
            .mime_str(&mime_type)
            .map_err(|error| Error::Upload(format!("Invalid attachment type: {error}")))?;
        let form = multipart::Form::new()
            .text(FIELD_CLIENT_MESSAGE_ID, client_message_id.to_string())
            .part(FIELD_ATTACHMENT, part);

        let send = self
            .authorize(self.client.post(&destination))
            .header(ACCEPT, TURBO_STREAM_ACCEPT)
            .multipart(form)
            .send();
        tokio::pin!(send);

        let response = loop {
            tokio::select! {
                response = &mut send => break response,
                Some(sent) = progress_rx.recv() => on_progress(percent_of(sent, total)),
            }
        }
        .map_err(|error| Error::Upload(format!("Upload request failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upload(format!(
                "Upload request failed with HTTP {status}: {}",
                compact_text(&body)
            )));
        }

        let payload = response
            .text()
            .await
            .map_err(|error| Error::Upload(format!("Failed to read upload response: {error}")))?;
        on_progress(100);
        Ok(payload)
    }
}

#[async_trait]
impl MessageForm for HttpComposerClient {
    async fn request_submit(&self, message: &OutgoingMessage) -> bool {
        match self.post_message(message).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(
                    client_message_id = %message.client_message_id,
                    "{error}"
                );
                false
            }
        }
    }
}

fn normalize_messages_url(raw: &str) -> Result<String> {
    let url = raw.trim().trim_end_matches('/').to_string();
    if url.is_empty() {
        return Err(Error::Config("Messages URL must not be empty".to_string()));
    }
    if !is_http_url(&url) {
        return Err(Error::Config(
            "Messages URL must include http:// or https://".to_string(),
        ));
    }
    Ok(url)
}
