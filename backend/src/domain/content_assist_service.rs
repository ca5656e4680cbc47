//! Optional AI content assistance.
//!
//! Provider trouble degrades to [`ContentOutcome::Unavailable`]; it never
//! becomes an error for the caller.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{
    ContentAssist, ContentOutcome, GenerationRequest, TextGenerator, TextGeneratorError,
};

pub const NOT_CONFIGURED_MESSAGE: &str =
    "AI features are not configured. Please add an API key to use AI features.";
pub const UNAVAILABLE_MESSAGE: &str = "AI service temporarily unavailable";

/// Content-assist service over a text generator.
#[derive(Clone)]
pub struct ContentAssistService<G: ?Sized> {
    generator: Arc<G>,
}

impl<G: ?Sized> ContentAssistService<G> {
    pub fn new(generator: Arc<G>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl<G: ?Sized> ContentAssist for ContentAssistService<G>
where
    G: TextGenerator,
{
    async fn generate_content(&self, request: GenerationRequest) -> Result<ContentOutcome, Error> {
        if request.prompt.trim().is_empty() {
            return Err(Error::invalid_request("prompt is required")
                .with_details(serde_json::json!({ "field": "prompt" })));
        }

        match self.generator.generate(&request).await {
            Ok(content) => Ok(ContentOutcome::Generated {
                content,
                content_type: request.content_type,
            }),
            Err(TextGeneratorError::NotConfigured) => Ok(ContentOutcome::Unavailable {
                message: NOT_CONFIGURED_MESSAGE.to_owned(),
            }),
            Err(TextGeneratorError::Unavailable { message }) => {
                warn!(error = %message, "text generation failed");
                Ok(ContentOutcome::Unavailable {
                    message: UNAVAILABLE_MESSAGE.to_owned(),
                })
            }
        }
    }
}
