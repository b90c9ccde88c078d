//! fever-chat-backend: Ollama-style chat backend with a fixed answer.
//!
//! Every chat request is answered with the same informational text about
//! fever, either as one JSON message or streamed word by word over
//! server-sent events, so a chat front-end can run without a real model.

pub mod config;
pub mod generation;
pub mod server;
