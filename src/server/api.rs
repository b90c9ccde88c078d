//! Ollama-style chat HTTP API.
//!
//! Routes:
//! - POST /api/chat
//! - GET /api/tags
//! - GET /health

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::sse::Sse;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::generation::provider::{ChatMessage, GenerationProvider, GenerationRequest};
use crate::server::error::ApiError;
use crate::server::streaming::generation_to_sse_stream;

/// Name and model id of the single advertised model.
pub const MODEL_NAME: &str = "python-backend";

/// Application state shared across handlers.
pub struct AppState {
    pub provider: Arc<dyn GenerationProvider>,
    pub config: Arc<Config>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(provider: Arc<dyn GenerationProvider>, config: Arc<Config>) -> Self {
        Self {
            provider,
            config,
            start_time: Instant::now(),
        }
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/tags", get(list_models))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─── Request/Response Types ────────────────────────────────────────────────

/// Chat request. Every field is optional.
///
/// `messages` is kept as raw JSON: its shape is never validated.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    pub messages: Option<serde_json::Value>,
    pub stream: Option<bool>,
}

impl ChatRequest {
    /// Parse a raw request body. An empty body means "all defaults".
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::bad_request(format!("Invalid chat request: {e}")))
    }

    pub fn is_stream(&self) -> bool {
        self.stream.unwrap_or(false)
    }

    /// Conversation turns, read leniently. Anything that is not an array
    /// yields no messages; entries lacking a string `role`/`content` get "".
    pub fn messages(&self) -> Vec<ChatMessage> {
        let Some(serde_json::Value::Array(entries)) = &self.messages else {
            return Vec::new();
        };
        entries.iter().map(lenient_message).collect()
    }
}

fn lenient_message(entry: &serde_json::Value) -> ChatMessage {
    let field = |name: &str| {
        entry
            .get(name)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    ChatMessage {
        role: field("role"),
        content: field("content"),
    }
}

/// Chat response (non-streaming).
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
}

/// Model listing response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelList {
    pub models: Vec<ModelDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    pub model: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, ApiError> {
    let req = ChatRequest::from_body(&body)?;
    let stream = req.is_stream();
    let messages = req.messages();
    let request_id = Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        messages = messages.len(),
        stream,
        "Chat request"
    );

    let gen_request = GenerationRequest {
        request_id: request_id.clone(),
        messages,
        system_prompt: state.config.assistant.system_prompt.clone(),
    };

    if stream {
        let rx = state.provider.stream(gen_request).await?;
        let events = generation_to_sse_stream(rx, request_id);
        Ok(Sse::new(events).into_response())
    } else {
        let content = state.provider.complete(gen_request).await?;
        Ok(Json(ChatResponse {
            message: ChatMessage {
                role: "assistant".to_string(),
                content,
            },
        })
        .into_response())
    }
}

async fn list_models() -> Json<ModelList> {
    Json(ModelList {
        models: vec![ModelDescriptor {
            name: MODEL_NAME.to_string(),
            model: MODEL_NAME.to_string(),
        }],
    })
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_defaults() {
        let req = ChatRequest::from_body(b"").unwrap();
        assert!(req.messages.is_none());
        assert!(!req.is_stream());

        let req = ChatRequest::from_body(b"  \n").unwrap();
        assert!(!req.is_stream());
    }

    #[test]
    fn test_null_fields_default() {
        let req = ChatRequest::from_body(br#"{"messages": null, "stream": null}"#).unwrap();
        assert!(!req.is_stream());
        assert!(req.messages().is_empty());
    }

    #[test]
    fn test_unknown_fields_and_partial_messages() {
        let req = ChatRequest::from_body(
            br#"{"model": "x", "messages": [{"role": "user"}, {}], "stream": true}"#,
        )
        .unwrap();
        let messages = req.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "");
        assert!(req.is_stream());
    }

    #[test]
    fn test_message_contents_are_not_validated() {
        let req = ChatRequest::from_body(
            br#"{"messages": [
                {"role": "user", "content": null},
                {"role": "user", "content": [{"type": "text", "text": "hola"}]},
                "hola",
                42,
                {"role": 7, "content": "fiebre"}
            ]}"#,
        )
        .unwrap();

        let messages = req.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "");
        assert_eq!(messages[1].content, "");
        assert_eq!(messages[2], ChatMessage::default());
        assert_eq!(messages[3], ChatMessage::default());
        assert_eq!(messages[4].role, "");
        assert_eq!(messages[4].content, "fiebre");
    }

    #[test]
    fn test_non_array_messages_are_empty() {
        for body in [&br#"{"messages": "hola"}"#[..], br#"{"messages": {"role": "user"}}"#] {
            let req = ChatRequest::from_body(body).unwrap();
            assert!(req.messages().is_empty());
        }
    }

    #[test]
    fn test_malformed_body_is_bad_request() {
        let err = ChatRequest::from_body(b"{not json").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);

        let err = ChatRequest::from_body(b"[1, 2]").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
