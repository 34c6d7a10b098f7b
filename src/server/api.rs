use crate::conversation;
use crate::llm::LlmError;
use crate::llm::ollama::{ ChatCompletion, OllamaClient };
use crate::models::chat::{
    ChatRequest,
    ChatResponse,
    HealthResponse,
    ServiceStatus,
    StreamEvent,
};
use std::convert::Infallible;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::State,
    response::sse::{ Event, KeepAlive, Sse },
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use futures::StreamExt;
use serde_json::json;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

/// Returned on the buffered path when a successful generation carries no
/// content field.
const EMPTY_COMPLETION_TEXT: &str = "No response generated";

#[derive(Clone)]
pub struct AppState {
    pub client: OllamaClient,
    pub system_prompt: Arc<String>,
}

impl AppState {
    pub fn new(client: OllamaClient, system_prompt: String) -> Self {
        Self {
            client,
            system_prompt: Arc::new(system_prompt),
        }
    }
}

pub fn router(state: AppState) -> Router {
    // Development-mode CORS: every origin, method and header.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/models", get(models_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(
    addr: &str,
    state: AppState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    info!("Starting HTTP API server on: http://{}", addr);

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({ "message": "Tutor gateway is running", "status": "healthy" }))
}

/// Never fails the caller: an unreachable backend is reported as data.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let reachable = state.client.probe().await;
    Json(HealthResponse {
        status: if reachable { ServiceStatus::Healthy } else { ServiceStatus::Degraded },
        ollama_available: reachable,
        model: state.client.default_model().to_string(),
    })
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Response {
    let messages = conversation::build(&req.message, &req.conversation_history, &state.system_prompt);
    let model = req.model.as_deref().unwrap_or_else(|| state.client.default_model());

    if req.stream {
        match state.client.chat_stream(&messages, model).await {
            Ok(events) => sse_response(events),
            Err(e) => error_response("chat stream", e),
        }
    } else {
        match state.client.chat(&messages, model).await {
            Ok(completion) => {
                Json(ChatResponse { response: collect_response(completion) }).into_response()
            }
            Err(e) => error_response("chat", e),
        }
    }
}

async fn models_handler(State(state): State<AppState>) -> Response {
    match state.client.list_models().await {
        Ok(catalog) => Json(catalog).into_response(),
        Err(e) => error_response("model listing", e),
    }
}

/// Buffered-path re-emitter: the final content field, or a fixed placeholder
/// when the generation was empty but successful.
fn collect_response(completion: ChatCompletion) -> String {
    completion.into_content().unwrap_or_else(|| EMPTY_COMPLETION_TEXT.to_string())
}

/// Streaming-path re-emitter: frames each decoded event as `data: <json>`.
/// The channel closes right after the terminal event, so the SSE body ends
/// with it.
fn sse_response(events: ReceiverStream<StreamEvent>) -> Response {
    let stream = events.map(|event| {
        let payload = serde_json::to_string(&event)
            .unwrap_or_else(|_| r#"{"error":"event serialization failed","done":true}"#.to_string());
        Ok::<_, Infallible>(Event::default().data(payload))
    });
    Sse::new(stream).keep_alive(KeepAlive::new()).into_response()
}

/// Maps pre-stream backend failures to HTTP responses with a generic detail
/// message; internal causes go to the log only.
fn error_response(context: &str, err: LlmError) -> Response {
    error!("Upstream {} request failed: {}", context, err);
    let status = match &err {
        LlmError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
        LlmError::BackendRequestFailed { status } => {
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY)
        }
    };
    (status, Json(json!({ "error": "upstream request failed" }))).into_response()
}
