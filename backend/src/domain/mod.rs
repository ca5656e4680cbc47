//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, plus the services that implement the driving ports.
//! Keep types free of transport concerns and document invariants in each
//! type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - User, Actor, Role — identities and their capabilities.
//! - Course, Lesson — authored content with an append-only lesson list.
//! - Progress — the enrollment record and its completion state.
//! - Services — catalogue, enrollment, progress, account, content assist.

pub mod account_service;
pub mod auth;
pub mod catalogue_service;
pub mod content_assist_service;
pub mod course;
pub mod enrollment_service;
pub mod error;
pub mod ports;
pub mod progress;
pub mod progress_service;
pub mod trace_id;
pub mod user;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::account_service::{AccountService, EMAIL_TAKEN_RULE};
pub use self::auth::{
    CredentialValidationError, LoginCredentials, PASSWORD_MIN_LEN, PasswordHash, Registration,
};
pub use self::catalogue_service::CourseCatalogueService;
pub use self::content_assist_service::ContentAssistService;
pub use self::course::{
    Course, CourseDetail, CourseDraft, CourseFilter, CourseId, CourseLevel, CoursePatch,
    CourseSnapshot, CourseValidationError, Lesson, LessonDraft, LessonResource, Price,
};
pub use self::enrollment_service::{ALREADY_ENROLLED_RULE, EnrollmentService, SELF_ENROLLMENT_RULE};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::progress::{
    EnrolledCourse, LessonUpdate, Progress, ProgressOverview, ProgressSnapshot,
    ProgressValidationError, QuizScore, QuizSubmission, completion_percentage,
};
pub use self::progress_service::{MAX_UPDATE_ATTEMPTS, ProgressService};
pub use self::trace_id::TraceId;
pub use self::user::{
    Actor, DISPLAY_NAME_MAX, DisplayName, Email, ProfilePatch, Role, User, UserDraft, UserId,
    UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use edumaster::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
