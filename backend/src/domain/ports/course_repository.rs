//! Port for course persistence.
//!
//! Courses are stored with their embedded lessons. Mutations use optimistic
//! concurrency: callers pass the revision they read, and adapters refuse the
//! write when another writer got there first.

use async_trait::async_trait;

use crate::domain::{Course, CourseFilter, CourseId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by course repository adapters.
    pub enum CourseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "course repository query failed: {message}",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
        /// The course vanished between read and write.
        Missing { course_id: String } =>
            "course {course_id} no longer exists",
    }
}

/// Port for course storage and catalogue queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Insert a newly created course.
    async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError>;

    /// Fetch a course regardless of published state.
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseRepositoryError>;

    /// Published courses matching `filter`, newest first.
    async fn list_published(
        &self,
        filter: &CourseFilter,
    ) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Every course owned by `instructor`, newest first.
    async fn list_by_instructor(
        &self,
        instructor: &UserId,
    ) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Replace the stored course when its revision still equals
    /// `expected_revision`. The caller has already bumped `course.revision()`.
    async fn save(
        &self,
        course: &Course,
        expected_revision: u32,
    ) -> Result<(), CourseRepositoryError>;

    /// Delete a course and every enrollment that references it in one
    /// transaction. Returns `false` when no course matched.
    async fn delete_with_enrollments(&self, id: &CourseId) -> Result<bool, CourseRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCourseRepository;

#[async_trait]
impl CourseRepository for FixtureCourseRepository {
    async fn insert(&self, _course: &Course) -> Result<(), CourseRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        Ok(None)
    }

    async fn list_published(
        &self,
        _filter: &CourseFilter,
    ) -> Result<Vec<Course>, CourseRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_by_instructor(
        &self,
        _instructor: &UserId,
    ) -> Result<Vec<Course>, CourseRepositoryError> {
        Ok(Vec::new())
    }

    async fn save(
        &self,
        _course: &Course,
        _expected_revision: u32,
    ) -> Result<(), CourseRepositoryError> {
        Ok(())
    }

    async fn delete_with_enrollments(&self, _id: &CourseId) -> Result<bool, CourseRepositoryError> {
        Ok(false)
    }
}
