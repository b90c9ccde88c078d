//! Generation provider seam.
//!
//! The HTTP layer never builds answers itself: it hands a [`GenerationRequest`]
//! to a [`GenerationProvider`] and either awaits the full text or forwards the
//! [`GenerationEvent`]s of a streaming run. Swapping the fixed-text provider
//! for a model-backed one leaves the endpoint contract untouched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Capacity of the channel between a streaming producer and the response body.
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Generation failed: {0}")]
    Failed(String),
}

/// A single conversation turn. Neither field is inspected by the fixed-text provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// A generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Unique request ID, used for log correlation.
    pub request_id: String,

    /// Conversation so far, oldest first.
    pub messages: Vec<ChatMessage>,

    /// System-role instruction for the assistant persona.
    pub system_prompt: String,
}

/// An event emitted by a streaming generation.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    /// A new fragment of output, including any trailing separator.
    Token { text: String },
    /// Generation is complete. Always the last event of a successful run.
    Done { completion_tokens: usize },
    /// Generation aborted; no further events follow.
    Error(String),
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Produce the whole answer at once.
    async fn complete(&self, request: GenerationRequest) -> Result<String, GenerationError>;

    /// Start a streaming generation.
    ///
    /// The producer stops as soon as the returned receiver is dropped.
    async fn stream(
        &self,
        request: GenerationRequest,
    ) -> Result<mpsc::Receiver<GenerationEvent>, GenerationError>;
}
