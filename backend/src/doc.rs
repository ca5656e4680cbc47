//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP handler, the request and response DTOs,
//! the error schema wrappers, and the session cookie security scheme. The
//! document backs Swagger UI in debug builds and is exported by the
//! `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::auth::{LoginRequest, ProfileRequest, RegisterRequest, UserResponse};
use crate::inbound::http::content::{GenerateContentRequest, GenerateContentResponse};
use crate::inbound::http::courses::{
    CourseDetailResponse, CoursePatchRequest, CourseRequest, CourseResponse,
    EnrolledCourseResponse, LessonRequest, LessonResourceDto, LessonResponse,
};
use crate::inbound::http::progress::{
    LessonUpdateRequest, ProgressOverviewResponse, ProgressResponse, QuizScoreRequest,
    QuizScoreResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login or /api/v1/auth/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "EduMaster API",
        description = "Course catalogue, enrollment, and lesson progress for the EduMaster LMS."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::get_profile,
        crate::inbound::http::auth::update_profile,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::list_enrolled,
        crate::inbound::http::courses::list_authored,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::update_course,
        crate::inbound::http::courses::delete_course,
        crate::inbound::http::courses::add_lesson,
        crate::inbound::http::courses::enroll,
        crate::inbound::http::progress::list_progress,
        crate::inbound::http::progress::get_progress,
        crate::inbound::http::progress::update_progress,
        crate::inbound::http::content::generate_content,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        ProfileRequest,
        UserResponse,
        CourseRequest,
        CoursePatchRequest,
        CourseResponse,
        CourseDetailResponse,
        EnrolledCourseResponse,
        LessonRequest,
        LessonResponse,
        LessonResourceDto,
        LessonUpdateRequest,
        QuizScoreRequest,
        QuizScoreResponse,
        ProgressResponse,
        ProgressOverviewResponse,
        GenerateContentRequest,
        GenerateContentResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login, and profiles"),
        (name = "courses", description = "Catalogue, authoring, and enrollment"),
        (name = "progress", description = "Lesson completion tracking"),
        (name = "ai", description = "Optional AI content assistance"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[rstest]
    #[case("/api/v1/auth/register")]
    #[case("/api/v1/courses/{id}/enroll")]
    #[case("/api/v1/courses/my/enrolled")]
    #[case("/api/v1/progress/{courseId}")]
    #[case("/api/v1/ai/generate-content")]
    #[case("/health/ready")]
    fn openapi_registers_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn progress_schema_uses_camel_case() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let progress = schemas.get("ProgressResponse").expect("Progress schema");

        assert_object_schema_has_field(progress, "completedLessons");
        assert_object_schema_has_field(progress, "lastAccessedLesson");
    }
}
