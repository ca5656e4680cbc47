//! Port for enrollment persistence.
//!
//! The enrollment record and the learner's progress are the same row. It is
//! the single source of truth for membership: course rosters and a user's
//! enrolled courses are read projections over it. Adapters must enforce
//! uniqueness of the (user, course) pair.

use async_trait::async_trait;

use crate::domain::{CourseId, EnrolledCourse, Progress, ProgressOverview, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by enrollment repository adapters.
    pub enum EnrollmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "enrollment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "enrollment repository query failed: {message}",
        /// A record for the (user, course) pair already exists.
        Duplicate { user_id: String, course_id: String } =>
            "user {user_id} is already enrolled in course {course_id}",
        /// The referenced course does not exist (for example, deleted mid-flight).
        CourseMissing { course_id: String } =>
            "course {course_id} does not exist",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
        /// The record vanished between read and write.
        Missing { user_id: String, course_id: String } =>
            "no enrollment for user {user_id} in course {course_id}",
    }
}

/// Port for enrollment/progress storage and the membership projections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Insert a new enrollment. Fails with
    /// [`EnrollmentRepositoryError::Duplicate`] when the pair already exists.
    async fn create(&self, progress: &Progress) -> Result<(), EnrollmentRepositoryError>;

    /// Fetch the record for a (user, course) pair.
    async fn find(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Progress>, EnrollmentRepositoryError>;

    /// Replace the record when its revision still equals `expected_revision`.
    async fn save(
        &self,
        progress: &Progress,
        expected_revision: u32,
    ) -> Result<(), EnrollmentRepositoryError>;

    /// All of a user's records joined with course display fields.
    async fn list_overviews(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProgressOverview>, EnrollmentRepositoryError>;

    /// Courses the user is enrolled in, in enrollment order.
    async fn list_enrolled_courses(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EnrolledCourse>, EnrollmentRepositoryError>;

    /// Users enrolled in a course, in enrollment order.
    async fn roster(&self, course_id: &CourseId) -> Result<Vec<UserId>, EnrollmentRepositoryError>;
}

/// Fixture implementation that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEnrollmentRepository;

#[async_trait]
impl EnrollmentRepository for FixtureEnrollmentRepository {
    async fn create(&self, _progress: &Progress) -> Result<(), EnrollmentRepositoryError> {
        Ok(())
    }

    async fn find(
        &self,
        _user_id: &UserId,
        _course_id: &CourseId,
    ) -> Result<Option<Progress>, EnrollmentRepositoryError> {
        Ok(None)
    }

    async fn save(
        &self,
        _progress: &Progress,
        _expected_revision: u32,
    ) -> Result<(), EnrollmentRepositoryError> {
        Ok(())
    }

    async fn list_overviews(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<ProgressOverview>, EnrollmentRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_enrolled_courses(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<EnrolledCourse>, EnrollmentRepositoryError> {
        Ok(Vec::new())
    }

    async fn roster(
        &self,
        _course_id: &CourseId,
    ) -> Result<Vec<UserId>, EnrollmentRepositoryError> {
        Ok(Vec::new())
    }
}
