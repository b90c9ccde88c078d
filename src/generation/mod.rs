//! Text generation behind the chat endpoint.
//!
//! - [`provider`]: The provider trait and the events a streaming generation emits
//! - [`fixed_text`]: Provider that replays a hardcoded answer word by word

pub mod fixed_text;
pub mod provider;
