//! Driving ports for enrollment and lesson progress.

use async_trait::async_trait;

use crate::domain::{
    Actor, CourseId, EnrolledCourse, Error, LessonUpdate, Progress, ProgressOverview, UserId,
};

/// Enrollment use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentCommand: Send + Sync {
    /// Enroll `actor` in a course and return the fresh progress record.
    async fn enroll(&self, actor: &Actor, course_id: &CourseId) -> Result<Progress, Error>;
}

/// Enrollment read use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentQuery: Send + Sync {
    /// Courses the user is enrolled in with headline progress.
    async fn enrolled_courses(&self, user_id: &UserId) -> Result<Vec<EnrolledCourse>, Error>;
}

/// Lesson progress use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressCommand: Send + Sync {
    /// Mark a lesson complete or incomplete and return the recomputed record.
    async fn record_lesson(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        update: LessonUpdate,
    ) -> Result<Progress, Error>;
}

/// Lesson progress reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressQuery: Send + Sync {
    /// The caller's record for one course.
    async fn progress(&self, user_id: &UserId, course_id: &CourseId) -> Result<Progress, Error>;

    /// Every record for the caller, joined with course display fields.
    async fn progress_overview(&self, user_id: &UserId) -> Result<Vec<ProgressOverview>, Error>;
}
