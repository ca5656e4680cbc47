//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Registered accounts.
    ///
    /// `email` carries a unique index; inserts that collide surface as
    /// unique violations.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        /// Salted digest; never leaves the persistence layer except for
        /// credential checks.
        password_hash -> Text,
        role -> Varchar,
        avatar -> Text,
        bio -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Courses with their embedded, append-only lesson list.
    courses (id) {
        id -> Uuid,
        instructor_id -> Uuid,
        title -> Text,
        description -> Text,
        category -> Text,
        level -> Varchar,
        price -> Float8,
        thumbnail -> Nullable<Text>,
        published -> Bool,
        /// JSON array of lessons in order.
        lessons -> Jsonb,
        rating -> Float8,
        tags -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        /// Optimistic concurrency token.
        revision -> Int4,
    }
}

diesel::table! {
    /// Enrollment and progress, one row per (user, course).
    enrollments (user_id, course_id) {
        user_id -> Uuid,
        course_id -> Uuid,
        completed_lessons -> Array<Int4>,
        last_accessed_lesson -> Int4,
        progress -> Int2,
        /// JSON array of quiz results, append-only.
        quiz_scores -> Jsonb,
        enrolled_at -> Timestamptz,
        last_accessed -> Timestamptz,
        completed -> Bool,
        completed_at -> Nullable<Timestamptz>,
        revision -> Int4,
    }
}

diesel::joinable!(courses -> users (instructor_id));
diesel::joinable!(enrollments -> courses (course_id));

diesel::allow_tables_to_appear_in_same_query!(users, courses, enrollments);
