//! SSE (Server-Sent Events) streaming for word-by-word responses.
//!
//! Converts a channel of GenerationEvents into an SSE stream whose payloads
//! use the `choices[].delta.content` chunk shape, closed by a `[DONE]` event.

use axum::response::sse::Event;
use futures::future;
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

use crate::generation::provider::{GenerationError, GenerationEvent};

/// Payload of the terminal event.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Streaming chat chunk.
#[derive(Debug, Serialize)]
pub struct StreamChunk {
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Serialize)]
pub struct ChunkChoice {
    pub delta: ChunkDelta,
}

#[derive(Debug, Serialize)]
pub struct ChunkDelta {
    pub content: String,
}

impl StreamChunk {
    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            choices: vec![ChunkChoice {
                delta: ChunkDelta {
                    content: content.into(),
                },
            }],
        }
    }

    /// Compact JSON line carried in the event's `data:` field.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn token_event(text: String) -> Result<Event, GenerationError> {
    let data = StreamChunk::delta(text)
        .to_json()
        .map_err(|e| GenerationError::Failed(e.to_string()))?;
    Ok(Event::default().data(data))
}

/// Convert a generation event receiver into an SSE stream.
///
/// `Done` becomes the `[DONE]` event and ends the stream. An `Error` event
/// surfaces as a stream error, which aborts the response body without `[DONE]`.
pub fn generation_to_sse_stream(
    rx: mpsc::Receiver<GenerationEvent>,
    request_id: String,
) -> impl Stream<Item = Result<Event, GenerationError>> {
    ReceiverStream::new(rx).scan(false, move |finished, event| {
        if *finished {
            return future::ready(None);
        }
        let item = match event {
            GenerationEvent::Token { text } => token_event(text),
            GenerationEvent::Done { .. } => {
                *finished = true;
                Ok(Event::default().data(DONE_SENTINEL))
            }
            GenerationEvent::Error(e) => {
                *finished = true;
                warn!(request_id = %request_id, error = %e, "Stream aborted");
                Err(GenerationError::Failed(e))
            }
        };
        future::ready(Some(item))
    })
}
