//! PostgreSQL-backed `EnrollmentRepository` implementation using Diesel ORM.
//!
//! The `enrollments` primary key on `(user_id, course_id)` is the uniqueness
//! guarantee for membership: a second insert for the same pair fails with a
//! unique violation, which this adapter reports as
//! [`EnrollmentRepositoryError::Duplicate`]. Rosters and enrolled-course lists
//! are read from the same rows.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{EnrollmentRepository, EnrollmentRepositoryError};
use crate::domain::{
    CourseId, EnrolledCourse, Progress, ProgressOverview, ProgressSnapshot, QuizScore, UserId,
};

use super::diesel_course_repository::row_to_course;
use super::diesel_helpers::{
    DieselFailure, cast_revision, cast_revision_for_db, classify_diesel_error, collect_rows,
    lesson_index_for_db, lesson_index_from_db, pool_error_message,
};
use super::models::{CourseRow, EnrollmentRow, EnrollmentWrite};
use super::pool::{DbPool, PoolError};
use super::schema::{courses, enrollments, users};

/// Diesel-backed implementation of the `EnrollmentRepository` port.
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    pool: DbPool,
}

impl DieselEnrollmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EnrollmentRepositoryError {
    EnrollmentRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> EnrollmentRepositoryError {
    match classify_diesel_error(error, "enrollment repository") {
        DieselFailure::Connection(message) => EnrollmentRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            EnrollmentRepositoryError::query("unexpected unique violation")
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            EnrollmentRepositoryError::query("foreign key violation")
        }
        DieselFailure::Query(message) => EnrollmentRepositoryError::query(message),
    }
}

/// Map insert failures, where key violations carry business meaning.
fn map_insert_error(error: diesel::result::Error, progress: &Progress) -> EnrollmentRepositoryError {
    let user_id = progress.user_id().to_string();
    let course_id = progress.course_id().to_string();
    match classify_diesel_error(error, "enrollment insert") {
        DieselFailure::UniqueViolation { .. } => {
            EnrollmentRepositoryError::duplicate(user_id, course_id)
        }
        DieselFailure::ForeignKeyViolation { constraint }
            if constraint
                .as_deref()
                .is_none_or(|name| name.contains("course")) =>
        {
            EnrollmentRepositoryError::course_missing(course_id)
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            EnrollmentRepositoryError::query(format!("user {user_id} does not exist"))
        }
        DieselFailure::Connection(message) => EnrollmentRepositoryError::connection(message),
        DieselFailure::Query(message) => EnrollmentRepositoryError::query(message),
    }
}

/// Convert a database row to a domain progress record.
fn row_to_progress(row: EnrollmentRow) -> Result<Progress, String> {
    let completed_lessons = row
        .completed_lessons
        .iter()
        .map(|index| lesson_index_from_db(*index))
        .collect::<Result<BTreeSet<u32>, String>>()?;
    let quiz_scores: Vec<QuizScore> = serde_json::from_value(row.quiz_scores)
        .map_err(|err| format!("malformed quiz scores: {err}"))?;
    let progress = u8::try_from(row.progress)
        .map_err(|_| format!("progress {} out of range", row.progress))?;
    Ok(Progress::from_snapshot(ProgressSnapshot {
        user_id: UserId::from_uuid(row.user_id),
        course_id: CourseId::from_uuid(row.course_id),
        completed_lessons,
        last_accessed_lesson: lesson_index_from_db(row.last_accessed_lesson)?,
        progress,
        quiz_scores,
        enrolled_at: row.enrolled_at,
        last_accessed: row.last_accessed,
        completed: row.completed,
        completed_at: row.completed_at,
        revision: cast_revision(row.revision),
    }))
}

fn progress_to_write(progress: &Progress) -> Result<EnrollmentWrite, EnrollmentRepositoryError> {
    let quiz_scores = serde_json::to_value(progress.quiz_scores()).map_err(|err| {
        EnrollmentRepositoryError::query(format!("failed to encode quiz scores: {err}"))
    })?;
    Ok(EnrollmentWrite {
        user_id: *progress.user_id().as_uuid(),
        course_id: *progress.course_id().as_uuid(),
        completed_lessons: progress
            .completed_lessons()
            .iter()
            .map(|index| lesson_index_for_db(*index))
            .collect(),
        last_accessed_lesson: lesson_index_for_db(progress.last_accessed_lesson()),
        progress: i16::from(progress.progress()),
        quiz_scores,
        enrolled_at: progress.enrolled_at(),
        last_accessed: progress.last_accessed(),
        completed: progress.completed(),
        completed_at: progress.completed_at(),
        revision: cast_revision_for_db(progress.revision()),
    })
}

fn query_error(message: String) -> EnrollmentRepositoryError {
    EnrollmentRepositoryError::query(message)
}

#[async_trait]
impl EnrollmentRepository for DieselEnrollmentRepository {
    async fn create(&self, progress: &Progress) -> Result<(), EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = progress_to_write(progress)?;

        diesel::insert_into(enrollments::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_insert_error(err, progress))
    }

    async fn find(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Progress>, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<EnrollmentRow> = enrollments::table
            .filter(enrollments::user_id.eq(user_id.as_uuid()))
            .filter(enrollments::course_id.eq(course_id.as_uuid()))
            .select(EnrollmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_progress).transpose().map_err(query_error)
    }

    async fn save(
        &self,
        progress: &Progress,
        expected_revision: u32,
    ) -> Result<(), EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = progress_to_write(progress)?;
        let user_id = *progress.user_id().as_uuid();
        let course_id = *progress.course_id().as_uuid();

        let updated = diesel::update(enrollments::table)
            .filter(enrollments::user_id.eq(user_id))
            .filter(enrollments::course_id.eq(course_id))
            .filter(enrollments::revision.eq(cast_revision_for_db(expected_revision)))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(());
        }

        let current: Option<i32> = enrollments::table
            .filter(enrollments::user_id.eq(user_id))
            .filter(enrollments::course_id.eq(course_id))
            .select(enrollments::revision)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Err(match current {
            Some(actual) => EnrollmentRepositoryError::revision_mismatch(
                expected_revision,
                cast_revision(actual),
            ),
            None => EnrollmentRepositoryError::missing(user_id.to_string(), course_id.to_string()),
        })
    }

    async fn list_overviews(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProgressOverview>, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(EnrollmentRow, String, Option<String>, String)> = enrollments::table
            .inner_join(courses::table.inner_join(users::table))
            .filter(enrollments::user_id.eq(user_id.as_uuid()))
            .select((
                EnrollmentRow::as_select(),
                courses::title,
                courses::thumbnail,
                users::name,
            ))
            .order_by(enrollments::last_accessed.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(
            rows.into_iter()
                .map(|(row, course_title, course_thumbnail, instructor_name)| {
                    Ok(ProgressOverview {
                        progress: row_to_progress(row)?,
                        course_title,
                        course_thumbnail,
                        instructor_name,
                    })
                }),
            query_error,
        )
    }

    async fn list_enrolled_courses(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EnrolledCourse>, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(CourseRow, i16, chrono::DateTime<chrono::Utc>)> = enrollments::table
            .inner_join(courses::table)
            .filter(enrollments::user_id.eq(user_id.as_uuid()))
            .select((
                CourseRow::as_select(),
                enrollments::progress,
                enrollments::last_accessed,
            ))
            .order_by(enrollments::enrolled_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(
            rows.into_iter().map(|(course, progress, last_accessed)| {
                Ok(EnrolledCourse {
                    course: row_to_course(course)?,
                    progress: u8::try_from(progress)
                        .map_err(|_| format!("progress {progress} out of range"))?,
                    last_accessed,
                })
            }),
            query_error,
        )
    }

    async fn roster(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<UserId>, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let ids: Vec<uuid::Uuid> = enrollments::table
            .filter(enrollments::course_id.eq(course_id.as_uuid()))
            .select(enrollments::user_id)
            .order_by(enrollments::enrolled_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }
}
