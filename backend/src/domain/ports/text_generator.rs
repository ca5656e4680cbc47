//! Driven port for the optional text-generation provider.
//!
//! The provider is strictly optional. Its absence or failure must never fail
//! the learning core; callers degrade to an explicit "unavailable" outcome.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by text-generation adapters.
    pub enum TextGeneratorError {
        /// No provider credentials are configured.
        NotConfigured => "text generation is not configured",
        /// The provider failed or returned an unusable response.
        Unavailable { message: String } => "text generation unavailable: {message}",
    }
}

/// Prompt submitted to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Free-form hint such as `lesson` or `quiz`, echoed back to callers.
    pub content_type: String,
}

/// Port for generating text from a prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, TextGeneratorError>;
}

/// Provider used when no credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledTextGenerator;

#[async_trait]
impl TextGenerator for DisabledTextGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, TextGeneratorError> {
        Err(TextGeneratorError::not_configured())
    }
}
