//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local repositories for database-less runs and tests
//! - **password_hasher**: Argon2id credential digests in PHC form
//! - **text_generation**: reqwest client for the content-assist provider
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod memory;
pub mod password_hasher;
pub mod persistence;
pub mod text_generation;
