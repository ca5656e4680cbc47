//! Reqwest-backed chat-completions adapter.
//!
//! Owns transport details only: request serialisation, bearer auth, timeout
//! and status mapping, and decoding the first choice's text. Every failure
//! becomes [`TextGeneratorError::Unavailable`] so callers can degrade.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::dto::{ChatMessageDto, ChatRequestDto, ChatResponseDto};
use crate::domain::ports::{GenerationRequest, TextGenerator, TextGeneratorError};

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";

const SYSTEM_PROMPT: &str = "You write clear, accurate educational content for online courses.";

/// Provider settings for [`HttpTextGenerator`].
#[derive(Clone)]
pub struct TextGenerationSettings {
    /// Bearer token for the provider.
    pub api_key: String,
    /// Chat-completions URL.
    pub endpoint: Url,
    /// Model identifier sent with each request.
    pub model: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

/// Text generator that POSTs to one chat-completions endpoint.
pub struct HttpTextGenerator {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    model: String,
}

impl HttpTextGenerator {
    /// Build an adapter with a reqwest client bound to `settings.timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: TextGenerationSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint,
            api_key: Zeroizing::new(settings.api_key),
            model: settings.model,
        })
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, TextGeneratorError> {
        let body = ChatRequestDto {
            model: self.model.as_str(),
            messages: vec![
                ChatMessageDto {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessageDto {
                    role: "user",
                    content: request.prompt.as_str(),
                },
            ],
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        parse_text(bytes.as_ref())
    }
}

fn parse_text(body: &[u8]) -> Result<String, TextGeneratorError> {
    let decoded: ChatResponseDto = serde_json::from_slice(body).map_err(|error| {
        TextGeneratorError::unavailable(format!("invalid completion payload: {error}"))
    })?;
    decoded.into_text().map_err(TextGeneratorError::unavailable)
}

fn map_transport_error(error: reqwest::Error) -> TextGeneratorError {
    if error.is_timeout() {
        TextGeneratorError::unavailable(format!("provider timed out: {error}"))
    } else {
        TextGeneratorError::unavailable(format!("transport error: {error}"))
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TextGeneratorError {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if preview.is_empty() {
        TextGeneratorError::unavailable(format!("status {}", status.as_u16()))
    } else {
        TextGeneratorError::unavailable(format!("status {}: {preview}", status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    #[test]
    fn first_choice_text_is_returned() {
        let body = r#"{
            "choices": [
                { "message": { "role": "assistant", "content": "Borrowing lends access." } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        }"#;

        let text = parse_text(body.as_bytes()).expect("payload should decode");
        assert_eq!(text, "Borrowing lends access.");
    }

    #[rstest]
    #[case::no_choices(r#"{"choices": []}"#)]
    #[case::null_content(r#"{"choices": [{"message": {"content": null}}]}"#)]
    #[case::blank_content(r#"{"choices": [{"message": {"content": "  "}}]}"#)]
    #[case::not_json("<html>bad gateway</html>")]
    fn unusable_payloads_are_unavailable(#[case] body: &str) {
        let error = parse_text(body.as_bytes()).expect_err("payload must fail");
        assert!(
            matches!(error, TextGeneratorError::Unavailable { .. }),
            "unusable payloads should map to Unavailable",
        );
    }

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED)]
    #[case(StatusCode::TOO_MANY_REQUESTS)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR)]
    fn error_statuses_carry_code_and_preview(#[case] status: StatusCode) {
        let error = map_status_error(status, b"{\"error\":  \"quota\"}");
        let message = error.to_string();
        assert!(message.contains(&status.as_u16().to_string()));
        assert!(message.contains("quota"));
    }
}
