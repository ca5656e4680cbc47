//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces `invalid_request` with `details.field` naming the
//! offending camelCase field and `details.code` naming the failure.

use serde_json::json;

use crate::domain::{CourseId, CourseLevel, CredentialValidationError, Error, UserValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {}", field.as_str()),
    )
}

/// Unwrap a required body field.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Parse a course identifier taken from the path.
pub(crate) fn parse_course_id(raw: &str, field: FieldName) -> Result<CourseId, Error> {
    CourseId::new(raw).map_err(|_| {
        Error::invalid_request(format!("{} must be a valid UUID", field.as_str())).with_details(
            json!({
                "field": field.as_str(),
                "value": raw,
                "code": ErrorCode::InvalidUuid.as_str(),
            }),
        )
    })
}

/// Parse an optional course level.
pub(crate) fn parse_level(raw: Option<&str>, field: FieldName) -> Result<Option<CourseLevel>, Error> {
    raw.map(|value| {
        value
            .parse::<CourseLevel>()
            .map_err(|err| field_error(field, ErrorCode::InvalidValue, err.to_string()))
    })
    .transpose()
}

/// Map registration and login validation failures to field-level errors.
pub(crate) fn credential_error(err: CredentialValidationError) -> Error {
    let field = match &err {
        CredentialValidationError::EmptyPassword
        | CredentialValidationError::PasswordTooShort { .. } => "password",
        CredentialValidationError::AdminRegistration => "role",
        CredentialValidationError::User(inner) => user_field(inner),
    };
    field_error(FieldName::new(field), ErrorCode::InvalidValue, err.to_string())
}

/// Map user field failures to field-level errors.
pub(crate) fn user_error(err: UserValidationError) -> Error {
    field_error(
        FieldName::new(user_field(&err)),
        ErrorCode::InvalidValue,
        err.to_string(),
    )
}

fn user_field(err: &UserValidationError) -> &'static str {
    match err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => "id",
        UserValidationError::EmptyDisplayName
        | UserValidationError::DisplayNameTooLong { .. } => "name",
        UserValidationError::EmptyEmail | UserValidationError::InvalidEmail => "email",
        UserValidationError::UnknownRole(_) => "role",
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a str> {
        error
            .details()
            .and_then(|details| details.get(key))
            .and_then(serde_json::Value::as_str)
    }

    #[rstest]
    fn course_ids_must_be_uuids() {
        let err = parse_course_id("not-a-uuid", FieldName::new("id")).expect_err("invalid");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(detail(&err, "code"), Some("invalid_uuid"));
        assert_eq!(detail(&err, "value"), Some("not-a-uuid"));
    }

    #[rstest]
    #[case(None, Ok(None))]
    #[case(Some("advanced"), Ok(Some(CourseLevel::Advanced)))]
    #[case(Some("expert"), Err("level"))]
    fn levels_parse(
        #[case] raw: Option<&str>,
        #[case] expected: Result<Option<CourseLevel>, &str>,
    ) {
        let parsed = parse_level(raw, FieldName::new("level"));
        match expected {
            Ok(level) => assert_eq!(parsed.expect("valid level"), level),
            Err(field) => {
                let err = parsed.expect_err("invalid level");
                assert_eq!(detail(&err, "field"), Some(field));
            }
        }
    }

    #[rstest]
    #[case(CredentialValidationError::PasswordTooShort { min: 6 }, "password")]
    #[case(CredentialValidationError::AdminRegistration, "role")]
    #[case(CredentialValidationError::User(UserValidationError::InvalidEmail), "email")]
    #[case(CredentialValidationError::User(UserValidationError::EmptyDisplayName), "name")]
    fn credential_errors_name_their_field(
        #[case] err: CredentialValidationError,
        #[case] field: &str,
    ) {
        let mapped = credential_error(err);
        assert_eq!(mapped.code(), DomainCode::InvalidRequest);
        assert_eq!(detail(&mapped, "field"), Some(field));
    }

    #[rstest]
    fn missing_fields_are_reported() {
        let err = require::<String>(None, FieldName::new("title")).expect_err("missing");
        assert_eq!(err.message(), "missing required field: title");
        assert_eq!(detail(&err, "code"), Some("missing_field"));
    }
}
