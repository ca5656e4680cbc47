//! Course catalogue, authoring, and enrollment HTTP handlers.
//!
//! ```text
//! GET    /api/v1/courses?category=&level=&search=
//! GET    /api/v1/courses/my/enrolled
//! GET    /api/v1/courses/my/instructor
//! GET    /api/v1/courses/{id}
//! POST   /api/v1/courses
//! PUT    /api/v1/courses/{id}
//! DELETE /api/v1/courses/{id}
//! POST   /api/v1/courses/{id}/lessons
//! POST   /api/v1/courses/{id}/enroll
//! ```
//!
//! The `my/*` routes must be registered ahead of `{id}` so the literal
//! segment wins.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::progress::ProgressResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_course_id};

#[path = "courses_dto.rs"]
mod dto;

pub use dto::{
    CourseDetailResponse, CourseListQuery, CoursePatchRequest, CourseRequest, CourseResponse,
    EnrolledCourseResponse, LessonRequest, LessonResourceDto, LessonResponse,
};
use dto::{CoursePath, parse_course_request, parse_filter, parse_lesson_request, parse_patch_request};

/// List published courses, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    params(
        ("category" = Option<String>, Query, description = "Exact category match"),
        ("level" = Option<String>, Query, description = "beginner, intermediate, or advanced"),
        ("search" = Option<String>, Query, description = "Case-insensitive text search")
    ),
    responses(
        (status = 200, description = "Published courses", body = [CourseResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "listCourses",
    security([])
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    query: web::Query<CourseListQuery>,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    let filter = parse_filter(query.into_inner())?;
    let courses = state.catalogue.list_published(&filter).await?;
    Ok(web::Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// Courses the caller is enrolled in, with headline progress.
#[utoipa::path(
    get,
    path = "/api/v1/courses/my/enrolled",
    responses(
        (status = 200, description = "Enrolled courses", body = [EnrolledCourseResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "listEnrolledCourses"
)]
#[get("/courses/my/enrolled")]
pub async fn list_enrolled(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<EnrolledCourseResponse>>> {
    let actor = session.require_actor()?;
    let courses = state.enrolled.enrolled_courses(actor.id()).await?;
    Ok(web::Json(
        courses.into_iter().map(EnrolledCourseResponse::from).collect(),
    ))
}

/// Courses authored by the caller, drafts included.
#[utoipa::path(
    get,
    path = "/api/v1/courses/my/instructor",
    responses(
        (status = 200, description = "Authored courses", body = [CourseResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller cannot author courses", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "listAuthoredCourses"
)]
#[get("/courses/my/instructor")]
pub async fn list_authored(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    let actor = session.require_actor()?;
    let courses = state.catalogue.list_authored(&actor).await?;
    Ok(web::Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// Fetch one course. Drafts are visible only to their owner and admins.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course detail", body = CourseDetailResponse),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "getCourse",
    security([], ("SessionCookie" = []))
)]
#[get("/courses/{id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CoursePath>,
) -> ApiResult<web::Json<CourseDetailResponse>> {
    let course_id = parse_course_id(&path.id, FieldName::new("id"))?;
    let viewer = session.actor()?;
    let detail = state.catalogue.course_detail(viewer, &course_id).await?;
    Ok(web::Json(CourseDetailResponse::from(detail)))
}

/// Create a course owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller cannot author courses", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CourseRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let draft = parse_course_request(payload.into_inner())?;
    let course = state.courses.create_course(&actor, draft).await?;
    Ok(HttpResponse::Created().json(CourseResponse::from(course)))
}

/// Apply a whitelisted patch to a course.
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course identifier")),
    request_body = CoursePatchRequest,
    responses(
        (status = 200, description = "Updated course", body = CourseResponse),
        (status = 400, description = "Invalid request or unknown field", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema),
        (status = 409, description = "Concurrent update", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "updateCourse"
)]
#[put("/courses/{id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CoursePath>,
    payload: web::Json<CoursePatchRequest>,
) -> ApiResult<web::Json<CourseResponse>> {
    let actor = session.require_actor()?;
    let course_id = parse_course_id(&path.id, FieldName::new("id"))?;
    let patch = parse_patch_request(payload.into_inner())?;
    let course = state.courses.update_course(&actor, &course_id, patch).await?;
    Ok(web::Json(CourseResponse::from(course)))
}

/// Delete a course and every enrollment in it.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course identifier")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CoursePath>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let course_id = parse_course_id(&path.id, FieldName::new("id"))?;
    state.courses.delete_course(&actor, &course_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Append a lesson to a course.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/lessons",
    params(("id" = String, Path, description = "Course identifier")),
    request_body = LessonRequest,
    responses(
        (status = 201, description = "Lesson appended", body = CourseResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema),
        (status = 409, description = "Concurrent update", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "addLesson"
)]
#[post("/courses/{id}/lessons")]
pub async fn add_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CoursePath>,
    payload: web::Json<LessonRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let course_id = parse_course_id(&path.id, FieldName::new("id"))?;
    let lesson = parse_lesson_request(payload.into_inner())?;
    let course = state.courses.add_lesson(&actor, &course_id, lesson).await?;
    Ok(HttpResponse::Created().json(CourseResponse::from(course)))
}

/// Enroll the caller in a course.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/enroll",
    params(("id" = String, Path, description = "Course identifier")),
    responses(
        (status = 201, description = "Enrolled", body = ProgressResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema),
        (status = 422, description = "Self-enrollment or already enrolled", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "enroll"
)]
#[post("/courses/{id}/enroll")]
pub async fn enroll(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CoursePath>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let course_id = parse_course_id(&path.id, FieldName::new("id"))?;
    let progress = state.enrollments.enroll(&actor, &course_id).await?;
    Ok(HttpResponse::Created().json(ProgressResponse::from(progress)))
}

#[cfg(test)]
#[path = "courses_tests.rs"]
mod tests;
