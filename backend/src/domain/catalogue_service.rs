//! Course catalogue domain service.
//!
//! Implements the course authoring and catalogue read ports. Authorisation
//! lives here rather than in handlers: creation needs an authoring role and
//! every mutation of an existing course needs ownership or admin rights.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    CourseCommand, CourseQuery, CourseRepository, CourseRepositoryError, EnrollmentRepository,
    EnrollmentRepositoryError, UserRepository, UserPersistenceError,
};
use crate::domain::{
    Actor, Course, CourseDetail, CourseDraft, CourseFilter, CourseId, CoursePatch,
    CourseValidationError, Error, LessonDraft,
};

/// Catalogue service over course, enrollment, and user repositories.
#[derive(Clone)]
pub struct CourseCatalogueService<C: ?Sized, E: ?Sized, U: ?Sized> {
    courses: Arc<C>,
    enrollments: Arc<E>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<C: ?Sized, E: ?Sized, U: ?Sized> CourseCatalogueService<C, E, U> {
    /// Create a new service with the given repositories and clock.
    pub fn new(
        courses: Arc<C>,
        enrollments: Arc<E>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            courses,
            enrollments,
            users,
            clock,
        }
    }
}

pub(crate) fn map_course_error(error: CourseRepositoryError) -> Error {
    match error {
        CourseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("course repository unavailable: {message}"))
        }
        CourseRepositoryError::Query { message } => {
            Error::internal(format!("course repository error: {message}"))
        }
        CourseRepositoryError::RevisionMismatch { expected, actual } => {
            Error::conflict("course was modified concurrently; retry").with_details(json!({
                "expectedRevision": expected,
                "actualRevision": actual,
                "code": "revision_mismatch",
            }))
        }
        CourseRepositoryError::Missing { .. } => Error::not_found("course not found"),
    }
}

fn map_roster_error(error: EnrollmentRepositoryError) -> Error {
    match error {
        EnrollmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("enrollment repository unavailable: {message}"))
        }
        other => Error::internal(format!("enrollment repository error: {other}")),
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

pub(crate) fn invalid_course(error: CourseValidationError) -> Error {
    let field = match &error {
        CourseValidationError::MissingField { field }
        | CourseValidationError::InvalidUrl { field } => Some(*field),
        CourseValidationError::InvalidPrice => Some("price"),
        CourseValidationError::UnknownLevel(_) => Some("level"),
        CourseValidationError::InvalidId => Some("id"),
    };
    let base = Error::invalid_request(error.to_string());
    match field {
        Some(field) => base.with_details(json!({ "field": field })),
        None => base,
    }
}

fn course_not_found(course_id: &CourseId) -> Error {
    Error::not_found("course not found").with_details(json!({ "courseId": course_id.to_string() }))
}

impl<C: ?Sized, E: ?Sized, U: ?Sized> CourseCatalogueService<C, E, U>
where
    C: CourseRepository,
    E: EnrollmentRepository,
    U: UserRepository,
{
    async fn load(&self, course_id: &CourseId) -> Result<Course, Error> {
        self.courses
            .find_by_id(course_id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| course_not_found(course_id))
    }

    async fn load_managed(&self, actor: &Actor, course_id: &CourseId) -> Result<Course, Error> {
        let course = self.load(course_id).await?;
        if !course.is_managed_by(actor) {
            return Err(Error::forbidden("only the course instructor or an admin may do this"));
        }
        Ok(course)
    }

    async fn persist(&self, course: &Course, expected_revision: u32) -> Result<(), Error> {
        self.courses
            .save(course, expected_revision)
            .await
            .map_err(map_course_error)
    }
}

#[async_trait]
impl<C: ?Sized, E: ?Sized, U: ?Sized> CourseCommand for CourseCatalogueService<C, E, U>
where
    C: CourseRepository,
    E: EnrollmentRepository,
    U: UserRepository,
{
    async fn create_course(&self, actor: &Actor, draft: CourseDraft) -> Result<Course, Error> {
        if !actor.role().can_author() {
            return Err(Error::forbidden("only instructors and admins can create courses"));
        }
        let course = Course::create(CourseId::random(), actor.id().clone(), draft, self.clock.utc())
            .map_err(invalid_course)?;
        self.courses
            .insert(&course)
            .await
            .map_err(map_course_error)?;
        info!(course_id = %course.id(), instructor = %actor.id(), "course created");
        Ok(course)
    }

    async fn update_course(
        &self,
        actor: &Actor,
        course_id: &CourseId,
        patch: CoursePatch,
    ) -> Result<Course, Error> {
        let mut course = self.load_managed(actor, course_id).await?;
        if patch.is_empty() {
            return Ok(course);
        }
        let expected = course.revision();
        course
            .apply_patch(patch, self.clock.utc())
            .map_err(invalid_course)?;
        self.persist(&course, expected).await?;
        Ok(course)
    }

    async fn delete_course(&self, actor: &Actor, course_id: &CourseId) -> Result<(), Error> {
        self.load_managed(actor, course_id).await?;
        let deleted = self
            .courses
            .delete_with_enrollments(course_id)
            .await
            .map_err(map_course_error)?;
        if !deleted {
            return Err(course_not_found(course_id));
        }
        info!(course_id = %course_id, actor = %actor.id(), "course deleted");
        Ok(())
    }

    async fn add_lesson(
        &self,
        actor: &Actor,
        course_id: &CourseId,
        lesson: LessonDraft,
    ) -> Result<Course, Error> {
        let mut course = self.load_managed(actor, course_id).await?;
        let expected = course.revision();
        course
            .append_lesson(lesson, self.clock.utc())
            .map_err(invalid_course)?;
        self.persist(&course, expected).await?;
        Ok(course)
    }
}

#[async_trait]
impl<C: ?Sized, E: ?Sized, U: ?Sized> CourseQuery for CourseCatalogueService<C, E, U>
where
    C: CourseRepository,
    E: EnrollmentRepository,
    U: UserRepository,
{
    async fn list_published(&self, filter: &CourseFilter) -> Result<Vec<Course>, Error> {
        self.courses
            .list_published(filter)
            .await
            .map_err(map_course_error)
    }

    async fn course_detail(
        &self,
        viewer: Option<Actor>,
        course_id: &CourseId,
    ) -> Result<CourseDetail, Error> {
        let course = self.load(course_id).await?;
        if !course.is_visible_to(viewer.as_ref()) {
            return Err(course_not_found(course_id));
        }
        let instructor_name = self
            .users
            .find_by_id(course.instructor())
            .await
            .map_err(map_user_error)?
            .map(|user| user.name().to_string());
        let enrolled_students = self
            .enrollments
            .roster(course_id)
            .await
            .map_err(map_roster_error)?;
        Ok(CourseDetail {
            course,
            instructor_name,
            enrolled_students,
        })
    }

    async fn list_authored(&self, actor: &Actor) -> Result<Vec<Course>, Error> {
        if !actor.role().can_author() {
            return Err(Error::forbidden("only instructors and admins author courses"));
        }
        self.courses
            .list_by_instructor(actor.id())
            .await
            .map_err(map_course_error)
    }
}

#[cfg(test)]
#[path = "catalogue_service_tests.rs"]
mod tests;
