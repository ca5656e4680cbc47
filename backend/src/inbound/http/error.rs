//! HTTP adapter mapping for domain errors.
//!
//! The domain error type stays HTTP-agnostic; this module turns it into a
//! JSON body and status code, logs server-side failures once at the
//! boundary, and redacts internal messages before they reach clients.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::BusinessRuleViolation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

fn log_server_side(error: &Error) {
    match error.code() {
        ErrorCode::InternalError => error!(
            trace_id = error.trace_id().unwrap_or_default(),
            message = error.message(),
            "request failed with internal error"
        ),
        ErrorCode::ServiceUnavailable => warn!(
            trace_id = error.trace_id().unwrap_or_default(),
            message = error.message(),
            "request failed: backing service unavailable"
        ),
        _ => {}
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        log_server_side(self);
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("Internal server error")
    }
}

/// Map JSON extractor failures to `invalid_request`, including unknown fields
/// rejected by `deny_unknown_fields`.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let detail = match &err {
        JsonPayloadError::Deserialize(inner) => inner.to_string(),
        JsonPayloadError::ContentType => "expected application/json".to_owned(),
        other => other.to_string(),
    };
    Error::invalid_request("invalid JSON payload")
        .with_details(json!({ "reason": detail }))
        .into()
}

/// Map path and query extractor failures to `invalid_request`.
pub fn extractor_error_handler<E>(err: E, _req: &HttpRequest) -> actix_web::Error
where
    E: std::fmt::Display,
{
    Error::invalid_request("invalid request parameters")
        .with_details(json!({ "reason": err.to_string() }))
        .into()
}
