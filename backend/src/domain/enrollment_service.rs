//! Enrollment domain service.
//!
//! Enrolling creates the single progress record for a (user, course) pair.
//! Duplicate detection rests on the repository's uniqueness guarantee, so
//! two concurrent enrollments for the same pair yield one record and one
//! `already_enrolled` rejection.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::catalogue_service::map_course_error;
use crate::domain::ports::{
    CourseRepository, EnrollmentCommand, EnrollmentQuery, EnrollmentRepository,
    EnrollmentRepositoryError,
};
use crate::domain::{Actor, CourseId, EnrolledCourse, Error, Progress, UserId};

/// Business rule raised when an instructor enrolls in their own course.
pub const SELF_ENROLLMENT_RULE: &str = "self_enrollment";
/// Business rule raised when the pair is already enrolled.
pub const ALREADY_ENROLLED_RULE: &str = "already_enrolled";

/// Enrollment service over course and enrollment repositories.
#[derive(Clone)]
pub struct EnrollmentService<C: ?Sized, E: ?Sized> {
    courses: Arc<C>,
    enrollments: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<C: ?Sized, E: ?Sized> EnrollmentService<C, E> {
    pub fn new(courses: Arc<C>, enrollments: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self {
            courses,
            enrollments,
            clock,
        }
    }
}

pub(crate) fn map_enrollment_error(error: EnrollmentRepositoryError) -> Error {
    match error {
        EnrollmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("enrollment repository unavailable: {message}"))
        }
        EnrollmentRepositoryError::Query { message } => {
            Error::internal(format!("enrollment repository error: {message}"))
        }
        EnrollmentRepositoryError::Duplicate { .. } => already_enrolled(),
        EnrollmentRepositoryError::CourseMissing { .. } => Error::not_found("course not found"),
        EnrollmentRepositoryError::RevisionMismatch { expected, actual } => {
            Error::conflict("progress was modified concurrently; retry").with_details(json!({
                "expectedRevision": expected,
                "actualRevision": actual,
                "code": "revision_mismatch",
            }))
        }
        EnrollmentRepositoryError::Missing { .. } => not_enrolled(),
    }
}

fn already_enrolled() -> Error {
    Error::business_rule(ALREADY_ENROLLED_RULE, "already enrolled in this course")
}

pub(crate) fn not_enrolled() -> Error {
    Error::not_found("progress not found; enroll first")
        .with_details(json!({ "code": "not_enrolled" }))
}

#[async_trait]
impl<C: ?Sized, E: ?Sized> EnrollmentCommand for EnrollmentService<C, E>
where
    C: CourseRepository,
    E: EnrollmentRepository,
{
    async fn enroll(&self, actor: &Actor, course_id: &CourseId) -> Result<Progress, Error> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await
            .map_err(map_course_error)?
            .filter(|course| course.is_visible_to(Some(actor)))
            .ok_or_else(|| Error::not_found("course not found"))?;

        if course.instructor() == actor.id() {
            return Err(Error::business_rule(
                SELF_ENROLLMENT_RULE,
                "instructors cannot enroll in their own course",
            ));
        }

        let progress = Progress::enroll(actor.id().clone(), *course_id, self.clock.utc());
        self.enrollments
            .create(&progress)
            .await
            .map_err(map_enrollment_error)?;
        info!(user_id = %actor.id(), course_id = %course_id, "enrolled");
        Ok(progress)
    }
}

#[async_trait]
impl<C: ?Sized, E: ?Sized> EnrollmentQuery for EnrollmentService<C, E>
where
    C: CourseRepository,
    E: EnrollmentRepository,
{
    async fn enrolled_courses(&self, user_id: &UserId) -> Result<Vec<EnrolledCourse>, Error> {
        self.enrollments
            .list_enrolled_courses(user_id)
            .await
            .map_err(map_enrollment_error)
    }
}

#[cfg(test)]
#[path = "enrollment_service_tests.rs"]
mod tests;
