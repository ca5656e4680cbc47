//! Lesson progress domain service.
//!
//! Each update is a read-modify-write of the progress record guarded by its
//! revision. A lost race is retried against fresh state a bounded number of
//! times before surfacing as a conflict, so concurrent updates for the same
//! learner never silently drop each other's completed lessons.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::catalogue_service::map_course_error;
use crate::domain::enrollment_service::{map_enrollment_error, not_enrolled};
use crate::domain::ports::{
    CourseRepository, EnrollmentRepository, EnrollmentRepositoryError, ProgressCommand,
    ProgressQuery,
};
use crate::domain::{
    Course, CourseId, Error, LessonUpdate, Progress, ProgressOverview, ProgressValidationError,
    UserId,
};

/// Attempts made before a contended update is reported as a conflict.
pub const MAX_UPDATE_ATTEMPTS: usize = 3;

/// Progress service over course and enrollment repositories.
#[derive(Clone)]
pub struct ProgressService<C: ?Sized, E: ?Sized> {
    courses: Arc<C>,
    enrollments: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<C: ?Sized, E: ?Sized> ProgressService<C, E> {
    pub fn new(courses: Arc<C>, enrollments: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self {
            courses,
            enrollments,
            clock,
        }
    }
}

fn invalid_update(error: ProgressValidationError) -> Error {
    let field = match error {
        ProgressValidationError::LessonOutOfRange { .. } => "lessonIndex",
        ProgressValidationError::EmptyQuiz
        | ProgressValidationError::ScoreExceedsQuestions { .. } => "quizScore",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

impl<C: ?Sized, E: ?Sized> ProgressService<C, E>
where
    C: CourseRepository,
    E: EnrollmentRepository,
{
    async fn load_course(&self, course_id: &CourseId) -> Result<Course, Error> {
        self.courses
            .find_by_id(course_id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found("course not found"))
    }

    async fn load_progress(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Progress, Error> {
        self.enrollments
            .find(user_id, course_id)
            .await
            .map_err(map_enrollment_error)?
            .ok_or_else(not_enrolled)
    }
}

#[async_trait]
impl<C: ?Sized, E: ?Sized> ProgressCommand for ProgressService<C, E>
where
    C: CourseRepository,
    E: EnrollmentRepository,
{
    async fn record_lesson(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        update: LessonUpdate,
    ) -> Result<Progress, Error> {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            // Re-read both sides each attempt: a concurrent lesson append
            // changes the denominator.
            let course = self.load_course(course_id).await?;
            let mut progress = self.load_progress(user_id, course_id).await?;
            let expected = progress.revision();
            progress
                .record_lesson(&course, &update, self.clock.utc())
                .map_err(invalid_update)?;

            match self.enrollments.save(&progress, expected).await {
                Ok(()) => return Ok(progress),
                Err(EnrollmentRepositoryError::RevisionMismatch { expected, actual }) => {
                    debug!(
                        user_id = %user_id,
                        course_id = %course_id,
                        attempt,
                        expected,
                        actual,
                        "progress write lost a race; retrying"
                    );
                }
                Err(error) => return Err(map_enrollment_error(error)),
            }
        }

        warn!(user_id = %user_id, course_id = %course_id, "progress update kept conflicting");
        Err(Error::conflict("progress is being updated concurrently; retry")
            .with_details(json!({ "code": "revision_mismatch" })))
    }
}

#[async_trait]
impl<C: ?Sized, E: ?Sized> ProgressQuery for ProgressService<C, E>
where
    C: CourseRepository,
    E: EnrollmentRepository,
{
    async fn progress(&self, user_id: &UserId, course_id: &CourseId) -> Result<Progress, Error> {
        self.load_progress(user_id, course_id).await
    }

    async fn progress_overview(&self, user_id: &UserId) -> Result<Vec<ProgressOverview>, Error> {
        self.enrollments
            .list_overviews(user_id)
            .await
            .map_err(map_enrollment_error)
    }
}

#[cfg(test)]
#[path = "progress_service_tests.rs"]
mod tests;
