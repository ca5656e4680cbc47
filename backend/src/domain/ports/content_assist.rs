//! Driving port for optional AI content assistance.

use async_trait::async_trait;

use crate::domain::Error;

use super::GenerationRequest;

/// Result of a content-assist request. Provider trouble is an outcome, not
/// an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOutcome {
    /// The provider produced text.
    Generated { content: String, content_type: String },
    /// No text was produced; `message` explains why in user-facing terms.
    Unavailable { message: String },
}

/// Content-assist use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentAssist: Send + Sync {
    /// Generate content. Only malformed requests produce `Err`.
    async fn generate_content(&self, request: GenerationRequest) -> Result<ContentOutcome, Error>;
}
