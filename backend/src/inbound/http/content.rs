//! AI content-assist HTTP handler.
//!
//! ```text
//! POST /api/v1/ai/generate-content {"prompt":"Explain borrowing","type":"lesson"}
//! ```
//!
//! Provider absence or failure still answers `200` with `fallback: true` so
//! authoring clients can carry on without generated text.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{ContentOutcome, GenerationRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require};

const DEFAULT_CONTENT_TYPE: &str = "lesson";

/// Request payload for content generation.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub prompt: Option<String>,
    /// Free-form hint such as `lesson`, `quiz`, or `summary`.
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

/// Generation outcome.
#[derive(Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

impl From<ContentOutcome> for GenerateContentResponse {
    fn from(outcome: ContentOutcome) -> Self {
        match outcome {
            ContentOutcome::Generated {
                content,
                content_type,
            } => Self {
                success: true,
                content: Some(content),
                content_type: Some(content_type),
                message: None,
                fallback: None,
            },
            ContentOutcome::Unavailable { message } => Self {
                success: false,
                content: None,
                content_type: None,
                message: Some(message),
                fallback: Some(true),
            },
        }
    }
}

/// Generate course content from a prompt.
#[utoipa::path(
    post,
    path = "/api/v1/ai/generate-content",
    request_body = GenerateContentRequest,
    responses(
        (status = 200, description = "Generated content or a fallback notice",
            body = GenerateContentResponse),
        (status = 400, description = "Prompt missing", body = ErrorSchema)
    ),
    tags = ["ai"],
    operation_id = "generateContent",
    security([])
)]
#[post("/ai/generate-content")]
pub async fn generate_content(
    state: web::Data<HttpState>,
    payload: web::Json<GenerateContentRequest>,
) -> ApiResult<web::Json<GenerateContentResponse>> {
    let payload = payload.into_inner();
    let request = GenerationRequest {
        prompt: require(payload.prompt, FieldName::new("prompt"))?,
        content_type: payload
            .content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned()),
    };
    let outcome = state.content.generate_content(request).await?;
    Ok(web::Json(GenerateContentResponse::from(outcome)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::Error;
    use crate::domain::ports::MockContentAssist;
    use crate::inbound::http::test_utils::memory_state;

    async fn call(state: web::Data<HttpState>, body: Value) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .service(web::scope("/api/v1").service(generate_content)),
        )
        .await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/ai/generate-content")
                .set_json(body)
                .to_request(),
        )
        .await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    fn with_content(content: MockContentAssist) -> web::Data<HttpState> {
        let (state, _store) = memory_state();
        let mut state = HttpState::clone(&state);
        state.content = Arc::new(content);
        web::Data::new(state)
    }

    #[actix_web::test]
    async fn unconfigured_provider_falls_back() {
        let (state, _store) = memory_state();

        let (status, body) = call(state, json!({ "prompt": "Explain traits" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("success"), Some(&Value::Bool(false)));
        assert_eq!(body.get("fallback"), Some(&Value::Bool(true)));
        assert!(
            body.get("message")
                .and_then(Value::as_str)
                .is_some_and(|message| message.starts_with("AI features are not configured"))
        );
    }

    #[actix_web::test]
    async fn generated_content_echoes_type() {
        let mut content = MockContentAssist::new();
        content
            .expect_generate_content()
            .withf(|request| request.content_type == "quiz")
            .times(1)
            .return_once(|request| {
                Ok(ContentOutcome::Generated {
                    content: "Q1".to_owned(),
                    content_type: request.content_type,
                })
            });

        let (status, body) = call(
            with_content(content),
            json!({ "prompt": "Borrowing quiz", "type": "quiz" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "success": true, "content": "Q1", "type": "quiz" })
        );
    }

    #[actix_web::test]
    async fn missing_prompt_is_rejected() {
        let mut content = MockContentAssist::new();
        content.expect_generate_content().times(0);

        let (status, body) = call(with_content(content), json!({ "type": "quiz" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body.pointer("/details/field").and_then(Value::as_str),
            Some("prompt")
        );
    }

    #[actix_web::test]
    async fn blank_prompt_is_rejected_by_the_service() {
        let mut content = MockContentAssist::new();
        content
            .expect_generate_content()
            .return_once(|_| Err(Error::invalid_request("prompt is required")));

        let (status, _body) = call(with_content(content), json!({ "prompt": "  " })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
