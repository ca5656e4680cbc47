//! Driving ports for course authoring and catalogue reads.

use async_trait::async_trait;

use crate::domain::{
    Actor, Course, CourseDetail, CourseDraft, CourseFilter, CourseId, CoursePatch, Error,
    LessonDraft,
};

/// Course authoring use-cases. Every operation checks that `actor` may act:
/// creation needs an authoring role, the rest need ownership or admin.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseCommand: Send + Sync {
    /// Create a course owned by `actor`.
    async fn create_course(&self, actor: &Actor, draft: CourseDraft) -> Result<Course, Error>;

    /// Apply a whitelisted patch and return the updated course.
    async fn update_course(
        &self,
        actor: &Actor,
        course_id: &CourseId,
        patch: CoursePatch,
    ) -> Result<Course, Error>;

    /// Delete the course and every enrollment for it.
    async fn delete_course(&self, actor: &Actor, course_id: &CourseId) -> Result<(), Error>;

    /// Append a lesson and return the updated course.
    async fn add_lesson(
        &self,
        actor: &Actor,
        course_id: &CourseId,
        lesson: LessonDraft,
    ) -> Result<Course, Error>;
}

/// Catalogue read use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseQuery: Send + Sync {
    /// Published courses matching `filter`, newest first.
    async fn list_published(&self, filter: &CourseFilter) -> Result<Vec<Course>, Error>;

    /// A single course with its roster. Drafts are reported as not found
    /// unless `viewer` owns the course or is an admin.
    async fn course_detail(
        &self,
        viewer: Option<Actor>,
        course_id: &CourseId,
    ) -> Result<CourseDetail, Error>;

    /// Courses authored by `actor`, drafts included.
    async fn list_authored(&self, actor: &Actor) -> Result<Vec<Course>, Error>;
}
