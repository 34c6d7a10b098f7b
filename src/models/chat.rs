use serde::{ Serialize, Deserialize };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Inbound body of POST /chat. Missing fields take their defaults here so
/// handlers never see a partially-validated request.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
    #[serde(default = "default_stream")]
    pub stream: bool,
    #[serde(default)]
    pub model: Option<String>,
}

fn default_stream() -> bool {
    true
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

#[derive(Clone, Debug, Serialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub ollama_available: bool,
    pub model: String,
}

/// One event on the outbound SSE channel. The `done: true` variants are
/// terminal; nothing follows them on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamEvent {
    Delta { chunk: String, done: bool },
    Failure { error: String, done: bool },
}

impl StreamEvent {
    pub fn chunk(text: impl Into<String>) -> Self {
        StreamEvent::Delta { chunk: text.into(), done: false }
    }

    pub fn done() -> Self {
        StreamEvent::Delta { chunk: String::new(), done: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Failure { error: message.into(), done: true }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            StreamEvent::Delta { done, .. } => *done,
            StreamEvent::Failure { .. } => true,
        }
    }
}
