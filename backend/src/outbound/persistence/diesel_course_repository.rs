//! PostgreSQL-backed `CourseRepository` implementation using Diesel ORM.
//!
//! Lessons are stored as a JSONB array on the course row so an append is a
//! single-row replacement guarded by the course revision. Deleting a course
//! removes its enrollments in the same transaction.

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{
    Course, CourseFilter, CourseId, CourseSnapshot, Lesson, Price, UserId,
};

use super::diesel_helpers::{
    DieselFailure, cast_revision, cast_revision_for_db, classify_diesel_error, collect_rows,
    like_pattern, pool_error_message,
};
use super::models::{CourseRow, CourseWrite};
use super::pool::{DbPool, PoolError};
use super::schema::{courses, enrollments};

/// Diesel-backed implementation of the `CourseRepository` port.
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Case-insensitive substring match on title, description, or any single tag.
fn search_clause(text: &str) -> Box<dyn BoxableExpression<courses::table, Pg, SqlType = Bool>> {
    let pattern = like_pattern(text);
    let any_tag =
        sql::<Bool>("EXISTS (SELECT 1 FROM unnest(courses.tags) AS t(tag) WHERE t.tag ILIKE ")
            .bind::<Text, _>(pattern.clone())
            .sql(" ESCAPE '\\')");
    Box::new(
        courses::title
            .ilike(pattern.clone())
            .or(courses::description.ilike(pattern))
            .or(any_tag),
    )
}

fn map_pool_error(error: PoolError) -> CourseRepositoryError {
    CourseRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> CourseRepositoryError {
    match classify_diesel_error(error, "course repository") {
        DieselFailure::Connection(message) => CourseRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            CourseRepositoryError::query("course identifier already exists")
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            CourseRepositoryError::query("course instructor does not exist")
        }
        DieselFailure::Query(message) => CourseRepositoryError::query(message),
    }
}

/// Convert a database row to a domain course.
pub(crate) fn row_to_course(row: CourseRow) -> Result<Course, String> {
    let lessons: Vec<Lesson> = serde_json::from_value(row.lessons)
        .map_err(|err| format!("course {} has malformed lessons: {err}", row.id))?;
    let level = row
        .level
        .parse()
        .map_err(|err| format!("course {}: {err}", row.id))?;
    let price = Price::new(row.price).map_err(|err| format!("course {}: {err}", row.id))?;
    Ok(Course::from_snapshot(CourseSnapshot {
        id: CourseId::from_uuid(row.id),
        instructor: UserId::from_uuid(row.instructor_id),
        title: row.title,
        description: row.description,
        category: row.category,
        level,
        price,
        thumbnail: row.thumbnail,
        published: row.published,
        lessons,
        rating: row.rating,
        tags: row.tags,
        created_at: row.created_at,
        updated_at: row.updated_at,
        revision: cast_revision(row.revision),
    }))
}

fn course_to_write(course: &Course) -> Result<CourseWrite<'_>, CourseRepositoryError> {
    let lessons = serde_json::to_value(course.lessons())
        .map_err(|err| CourseRepositoryError::query(format!("failed to encode lessons: {err}")))?;
    Ok(CourseWrite {
        id: *course.id().as_uuid(),
        instructor_id: *course.instructor().as_uuid(),
        title: course.title(),
        description: course.description(),
        category: course.category(),
        level: course.level().as_str(),
        price: course.price().value(),
        thumbnail: course.thumbnail(),
        published: course.published(),
        lessons,
        rating: course.rating(),
        tags: course.tags(),
        created_at: course.created_at(),
        updated_at: course.updated_at(),
        revision: cast_revision_for_db(course.revision()),
    })
}

fn rows_to_courses(rows: Vec<CourseRow>) -> Result<Vec<Course>, CourseRepositoryError> {
    collect_rows(rows.into_iter().map(row_to_course), CourseRepositoryError::query)
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = course_to_write(course)?;

        diesel::insert_into(courses::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CourseRow> = courses::table
            .filter(courses::id.eq(id.as_uuid()))
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_course)
            .transpose()
            .map_err(CourseRepositoryError::query)
    }

    async fn list_published(
        &self,
        filter: &CourseFilter,
    ) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = courses::table
            .filter(courses::published.eq(true))
            .select(CourseRow::as_select())
            .into_boxed();
        if let Some(category) = filter.category.as_deref() {
            query = query.filter(courses::category.eq(category.to_owned()));
        }
        if let Some(level) = filter.level {
            query = query.filter(courses::level.eq(level.as_str()));
        }
        if let Some(text) = filter.search_text() {
            query = query.filter(search_clause(text));
        }

        let rows: Vec<CourseRow> = query
            .order_by(courses::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_courses(rows)
    }

    async fn list_by_instructor(
        &self,
        instructor: &UserId,
    ) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CourseRow> = courses::table
            .filter(courses::instructor_id.eq(instructor.as_uuid()))
            .select(CourseRow::as_select())
            .order_by(courses::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_courses(rows)
    }

    async fn save(
        &self,
        course: &Course,
        expected_revision: u32,
    ) -> Result<(), CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = course_to_write(course)?;
        let id = *course.id().as_uuid();

        let updated = diesel::update(courses::table)
            .filter(
                courses::id
                    .eq(id)
                    .and(courses::revision.eq(cast_revision_for_db(expected_revision))),
            )
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(());
        }

        let current: Option<i32> = courses::table
            .filter(courses::id.eq(id))
            .select(courses::revision)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Err(match current {
            Some(actual) => {
                CourseRepositoryError::revision_mismatch(expected_revision, cast_revision(actual))
            }
            None => CourseRepositoryError::missing(id.to_string()),
        })
    }

    async fn delete_with_enrollments(&self, id: &CourseId) -> Result<bool, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let course_id = *id.as_uuid();

        let deleted = conn
            .transaction(|conn| {
                async move {
                    diesel::delete(enrollments::table.filter(enrollments::course_id.eq(course_id)))
                        .execute(conn)
                        .await?;
                    diesel::delete(courses::table.filter(courses::id.eq(course_id)))
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    fn row(lessons: serde_json::Value) -> CourseRow {
        let now = Utc::now();
        CourseRow {
            id: Uuid::new_v4(),
            instructor_id: Uuid::new_v4(),
            title: "Rust basics".into(),
            description: "Ownership".into(),
            category: "Programming".into(),
            level: "intermediate".into(),
            price: 19.5,
            thumbnail: None,
            published: true,
            lessons,
            rating: 4.5,
            tags: vec!["rust".into()],
            created_at: now,
            updated_at: now,
            revision: 3,
        }
    }

    #[rstest]
    fn row_converts_with_lessons_in_order() {
        let lessons = json!([
            {"title": "Intro", "content": "Hello", "durationMinutes": 5, "order": 0},
            {"title": "Borrowing", "content": "&T", "durationMinutes": 10, "order": 1,
             "resources": [{"title": "Book", "url": "https://doc.rust-lang.org", "type": "link"}]}
        ]);
        let course = row_to_course(row(lessons)).expect("valid row");

        assert_eq!(course.lesson_count(), 2);
        assert_eq!(course.lessons()[1].order(), 1);
        assert_eq!(course.lessons()[1].resources()[0].kind, "link");
        assert_eq!(course.revision(), 3);
        assert_eq!(course.level().as_str(), "intermediate");
    }

    #[rstest]
    fn malformed_lessons_are_reported() {
        let err = row_to_course(row(json!({"not": "an array"}))).expect_err("bad json");
        assert!(err.contains("malformed lessons"));
    }

    #[rstest]
    fn course_write_encodes_lessons_as_array() {
        let course = row_to_course(row(json!([
            {"title": "Intro", "content": "Hello", "durationMinutes": 5, "order": 0}
        ])))
        .expect("valid row");
        let write = course_to_write(&course).expect("encodes");

        assert_eq!(write.lessons.as_array().map(Vec::len), Some(1));
        assert_eq!(write.revision, 3);
        assert_eq!(write.level, "intermediate");
    }

    #[rstest]
    fn tag_search_matches_each_tag_separately() {
        let query = courses::table
            .select(courses::id)
            .filter(search_clause("t w"));
        let sql = diesel::debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains("unnest(courses.tags)"), "{sql}");
        assert!(sql.contains("t.tag ILIKE $"), "{sql}");
        assert!(sql.contains("ESCAPE '\\'"), "{sql}");
        assert!(!sql.contains("array_to_string"), "{sql}");
        assert!(sql.contains("\"%t w%\""), "{sql}");
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, CourseRepositoryError::Connection { .. }));
    }
}
