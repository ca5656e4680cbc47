//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations translate between Diesel rows and domain types
//! and nothing more; every rule lives in the domain services. Row structs and
//! the table schema stay private to this module. Connections come from a
//! shared `bb8` pool through `diesel-async`.
//!
//! # Example
//!
//! ```ignore
//! use edumaster::outbound::persistence::{DbPool, DieselCourseRepository, PoolConfig};
//!
//! run_pending_migrations("postgres://localhost/edumaster").await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/edumaster")).await?;
//! let courses = DieselCourseRepository::new(pool);
//! ```

mod diesel_course_repository;
mod diesel_enrollment_repository;
pub(crate) mod diesel_helpers;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_enrollment_repository::DieselEnrollmentRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
