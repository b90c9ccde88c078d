//! Provider that answers every request with the same hardcoded text.
//!
//! Streaming splits the text on whitespace and emits each word followed by a
//! single space, emulating a token-streaming model.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::generation::provider::{
    GenerationError, GenerationEvent, GenerationProvider, GenerationRequest,
    EVENT_CHANNEL_CAPACITY,
};

/// The answer returned for every chat request.
pub const FIXED_TEXT: &str = "La fiebre es un aumento de la temperatura corporal, generalmente superior a 38°C. Es una respuesta del sistema inmunológico a infecciones. Si persiste más de 3 días o supera 39°C, consulta a un médico. Esta información no sustituye atención médica profesional.";

/// Split text into stream tokens: whitespace-separated words, punctuation attached.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(|word| format!("{word} ")).collect()
}

#[derive(Debug, Clone)]
pub struct FixedTextProvider {
    text: &'static str,
}

impl Default for FixedTextProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedTextProvider {
    pub fn new() -> Self {
        Self { text: FIXED_TEXT }
    }

    /// Provider replaying a different static answer.
    pub fn with_text(text: &'static str) -> Self {
        Self { text }
    }
}

/// Send every token, then `Done`. Returns how many tokens were delivered.
///
/// Stops at the first failed send, which means the consumer went away.
async fn produce(
    request_id: &str,
    tokens: Vec<String>,
    tx: &mpsc::Sender<GenerationEvent>,
) -> usize {
    let mut sent = 0;
    for text in tokens {
        if tx.send(GenerationEvent::Token { text }).await.is_err() {
            debug!(request_id, sent, "Stream consumer dropped, stopping");
            return sent;
        }
        sent += 1;
    }

    if tx
        .send(GenerationEvent::Done {
            completion_tokens: sent,
        })
        .await
        .is_err()
    {
        debug!(request_id, sent, "Stream consumer dropped before Done");
    }
    sent
}

#[async_trait]
impl GenerationProvider for FixedTextProvider {
    async fn complete(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        debug!(
            request_id = %request.request_id,
            messages = request.messages.len(),
            "Returning fixed answer"
        );
        Ok(self.text.to_string())
    }

    async fn stream(
        &self,
        request: GenerationRequest,
    ) -> Result<mpsc::Receiver<GenerationEvent>, GenerationError> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let tokens = tokenize(self.text);

        tokio::spawn(async move {
            info!(
                request_id = %request.request_id,
                tokens = tokens.len(),
                "Starting stream"
            );
            let sent = produce(&request.request_id, tokens, &tx).await;
            info!(request_id = %request.request_id, sent, "Stream complete");
        });

        Ok(rx)
    }
}
