//! Lesson progress HTTP handlers.
//!
//! ```text
//! GET /api/v1/progress
//! GET /api/v1/progress/{courseId}
//! PUT /api/v1/progress/{courseId} {"lessonIndex":0,"completed":true}
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Error, LessonUpdate, Progress, ProgressOverview, ProgressValidationError, QuizScore,
    QuizSubmission,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_course_id, require};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProgressPath {
    pub(super) course_id: String,
}

/// Quiz result submitted with a lesson update.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizScoreRequest {
    pub score: u32,
    pub total_questions: u32,
}

/// Request payload for marking a lesson complete or incomplete.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonUpdateRequest {
    /// Zero-based lesson position.
    pub lesson_index: Option<u32>,
    pub completed: Option<bool>,
    pub quiz_score: Option<QuizScoreRequest>,
}

/// Stored quiz result.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizScoreResponse {
    pub lesson_index: u32,
    pub score: u32,
    pub total_questions: u32,
    pub completed_at: String,
}

impl From<&QuizScore> for QuizScoreResponse {
    fn from(value: &QuizScore) -> Self {
        Self {
            lesson_index: value.lesson_index,
            score: value.score,
            total_questions: value.total_questions,
            completed_at: value.completed_at.to_rfc3339(),
        }
    }
}

/// Enrollment progress for one course.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub user_id: String,
    pub course_id: String,
    pub completed_lessons: Vec<u32>,
    pub last_accessed_lesson: u32,
    /// Whole-number completion percentage.
    pub progress: u8,
    pub quiz_scores: Vec<QuizScoreResponse>,
    pub enrolled_at: String,
    pub last_accessed: String,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub revision: u32,
}

impl From<&Progress> for ProgressResponse {
    fn from(value: &Progress) -> Self {
        Self {
            user_id: value.user_id().to_string(),
            course_id: value.course_id().to_string(),
            completed_lessons: value.completed_lessons().iter().copied().collect(),
            last_accessed_lesson: value.last_accessed_lesson(),
            progress: value.progress(),
            quiz_scores: value
                .quiz_scores()
                .iter()
                .map(QuizScoreResponse::from)
                .collect(),
            enrolled_at: value.enrolled_at().to_rfc3339(),
            last_accessed: value.last_accessed().to_rfc3339(),
            completed: value.completed(),
            completed_at: value.completed_at().map(|at| at.to_rfc3339()),
            revision: value.revision(),
        }
    }
}

impl From<Progress> for ProgressResponse {
    fn from(value: Progress) -> Self {
        Self::from(&value)
    }
}

/// Progress joined with the course's display fields.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOverviewResponse {
    #[serde(flatten)]
    pub progress: ProgressResponse,
    pub course_title: String,
    pub course_thumbnail: Option<String>,
    pub instructor_name: String,
}

impl From<ProgressOverview> for ProgressOverviewResponse {
    fn from(value: ProgressOverview) -> Self {
        Self {
            progress: ProgressResponse::from(&value.progress),
            course_title: value.course_title,
            course_thumbnail: value.course_thumbnail,
            instructor_name: value.instructor_name,
        }
    }
}

fn invalid_quiz(err: ProgressValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": "quizScore",
        "code": "invalid_value",
    }))
}

fn parse_lesson_update(payload: LessonUpdateRequest) -> Result<LessonUpdate, Error> {
    let lesson_index = require(payload.lesson_index, FieldName::new("lessonIndex"))?;
    let completed = require(payload.completed, FieldName::new("completed"))?;
    let quiz = payload
        .quiz_score
        .map(|quiz| QuizSubmission::new(quiz.score, quiz.total_questions))
        .transpose()
        .map_err(invalid_quiz)?;
    Ok(LessonUpdate {
        lesson_index,
        completed,
        quiz,
    })
}

/// Every progress record for the caller, most recently accessed first.
#[utoipa::path(
    get,
    path = "/api/v1/progress",
    responses(
        (status = 200, description = "Progress overview", body = [ProgressOverviewResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "listProgress"
)]
#[get("/progress")]
pub async fn list_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ProgressOverviewResponse>>> {
    let actor = session.require_actor()?;
    let records = state.progress_query.progress_overview(actor.id()).await?;
    Ok(web::Json(
        records
            .into_iter()
            .map(ProgressOverviewResponse::from)
            .collect(),
    ))
}

/// The caller's progress in one course.
#[utoipa::path(
    get,
    path = "/api/v1/progress/{courseId}",
    params(("courseId" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Progress", body = ProgressResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not enrolled", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "getProgress"
)]
#[get("/progress/{courseId}")]
pub async fn get_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ProgressPath>,
) -> ApiResult<web::Json<ProgressResponse>> {
    let actor = session.require_actor()?;
    let course_id = parse_course_id(&path.course_id, FieldName::new("courseId"))?;
    let progress = state.progress_query.progress(actor.id(), &course_id).await?;
    Ok(web::Json(ProgressResponse::from(progress)))
}

/// Mark a lesson complete or incomplete and return the recomputed record.
#[utoipa::path(
    put,
    path = "/api/v1/progress/{courseId}",
    params(("courseId" = String, Path, description = "Course identifier")),
    request_body = LessonUpdateRequest,
    responses(
        (status = 200, description = "Updated progress", body = ProgressResponse),
        (status = 400, description = "Invalid request or lesson index", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Course missing or not enrolled", body = ErrorSchema),
        (status = 409, description = "Concurrent update", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "updateProgress"
)]
#[put("/progress/{courseId}")]
pub async fn update_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ProgressPath>,
    payload: web::Json<LessonUpdateRequest>,
) -> ApiResult<web::Json<ProgressResponse>> {
    let actor = session.require_actor()?;
    let course_id = parse_course_id(&path.course_id, FieldName::new("courseId"))?;
    let update = parse_lesson_update(payload.into_inner())?;
    let progress = state
        .progress
        .record_lesson(actor.id(), &course_id, update)
        .await?;
    Ok(web::Json(ProgressResponse::from(progress)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(LessonUpdateRequest { completed: Some(true), ..LessonUpdateRequest::default() }, "lessonIndex")]
    #[case(LessonUpdateRequest { lesson_index: Some(0), ..LessonUpdateRequest::default() }, "completed")]
    #[case(
        LessonUpdateRequest {
            lesson_index: Some(0),
            completed: Some(true),
            quiz_score: Some(QuizScoreRequest { score: 6, total_questions: 5 }),
        },
        "quizScore"
    )]
    fn parse_lesson_update_names_the_bad_field(
        #[case] payload: LessonUpdateRequest,
        #[case] field: &str,
    ) {
        let err = parse_lesson_update(payload).expect_err("invalid update");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details()
                .and_then(|details| details.get("field"))
                .and_then(serde_json::Value::as_str),
            Some(field)
        );
    }

    #[rstest]
    fn parse_lesson_update_carries_quiz() {
        let update = parse_lesson_update(LessonUpdateRequest {
            lesson_index: Some(2),
            completed: Some(true),
            quiz_score: Some(QuizScoreRequest {
                score: 4,
                total_questions: 5,
            }),
        })
        .expect("valid update");

        assert_eq!(update.lesson_index, 2);
        assert!(update.completed);
        assert_eq!(update.quiz, Some(QuizSubmission::new(4, 5).expect("valid quiz")));
    }
}
