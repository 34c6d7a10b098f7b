use super::LlmError;
use super::stream;
use crate::models::chat::{ ChatMessage, StreamEvent };
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Events buffered between the decoder task and a slow SSE consumer before
/// backpressure suspends the upstream read.
const STREAM_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// Chat calls tolerate slow generation: the long timeout tier bounds
    /// inactivity between reads, never the total call, so a stream that
    /// keeps producing is not cut off for running long.
    chat_http: HttpClient,
    /// Reachability probes and catalog lookups must answer quickly.
    probe_http: HttpClient,
    base_url: String,
    default_model: String,
}

#[derive(Serialize)]
struct ChatCall<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Complete /api/chat body in buffered mode. Both fields are optional on the
/// wire; an empty-but-successful generation is a valid outcome.
#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub message: Option<CompletionMessage>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    pub fn into_content(self) -> Option<String> {
        self.message.and_then(|m| m.content)
    }
}

impl OllamaClient {
    pub fn new(
        base_url: String,
        default_model: String,
        chat_timeout: Duration,
        probe_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            chat_http: HttpClient::builder()
                .connect_timeout(chat_timeout)
                .read_timeout(chat_timeout)
                .build()?,
            probe_http: HttpClient::builder().timeout(probe_timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model,
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
        streaming: bool,
    ) -> Result<reqwest::Response, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        let call = ChatCall { model, messages, stream: streaming };
        let resp = self.chat_http
            .post(&url)
            .json(&call)
            .send().await
            .map_err(LlmError::BackendUnavailable)?;
        if !resp.status().is_success() {
            return Err(LlmError::BackendRequestFailed { status: resp.status() });
        }
        Ok(resp)
    }

    /// Buffered mode: waits for the complete backend response.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<ChatCompletion, LlmError> {
        let resp = self.send_chat(messages, model, false).await?;
        resp.json::<ChatCompletion>().await.map_err(LlmError::BackendUnavailable)
    }

    /// Streaming mode: opens the backend call, then hands the connection to
    /// a decoder task feeding a bounded channel. Errors raised here happen
    /// before any event is emitted and surface as HTTP failures; once the
    /// stream is live, failures arrive as terminal events on the channel.
    /// Dropping the returned stream tears the decoder task down on its next
    /// send, releasing the upstream connection.
    pub async fn chat_stream(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<ReceiverStream<StreamEvent>, LlmError> {
        let resp = self.send_chat(messages, model, true).await?;
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(stream::pump(resp, tx));
        Ok(ReceiverStream::new(rx))
    }

    /// Passthrough of the backend's model catalog (short timeout tier).
    pub async fn list_models(&self) -> Result<serde_json::Value, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self.probe_http
            .get(&url)
            .send().await
            .map_err(LlmError::BackendUnavailable)?;
        if !resp.status().is_success() {
            return Err(LlmError::BackendRequestFailed { status: resp.status() });
        }
        resp.json::<serde_json::Value>().await.map_err(LlmError::BackendUnavailable)
    }

    /// Reachability check against the model-listing endpoint. Any failure is
    /// reported as `false`, never as an error.
    pub async fn probe(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.probe_http.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}
