//! Text-generation outbound adapters.
//!
//! A thin HTTP implementation of the `TextGenerator` port against an
//! OpenAI-compatible chat-completions endpoint.

mod dto;
mod http_generator;

pub use http_generator::{DEFAULT_ENDPOINT, DEFAULT_MODEL, HttpTextGenerator, TextGenerationSettings};
