//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain reaches storage, password hashing,
//! and the text-generation provider. Each exposes a strongly typed error enum
//! so adapters map their failures into predictable variants. Driving ports
//! are the use-cases inbound adapters call; they return domain [`Error`]s.
//!
//! [`Error`]: crate::domain::Error

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod content_assist;
mod course_command;
mod course_repository;
mod enrollment_command;
mod enrollment_repository;
mod password_hasher;
mod text_generator;
mod user_repository;

pub use account_command::{AccountCommand, AccountQuery};
#[cfg(test)]
pub use account_command::{MockAccountCommand, MockAccountQuery};
pub use content_assist::{ContentAssist, ContentOutcome};
#[cfg(test)]
pub use content_assist::MockContentAssist;
pub use course_command::{CourseCommand, CourseQuery};
#[cfg(test)]
pub use course_command::{MockCourseCommand, MockCourseQuery};
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CourseRepository, CourseRepositoryError, FixtureCourseRepository};
pub use enrollment_command::{EnrollmentCommand, EnrollmentQuery, ProgressCommand, ProgressQuery};
#[cfg(test)]
pub use enrollment_command::{
    MockEnrollmentCommand, MockEnrollmentQuery, MockProgressCommand, MockProgressQuery,
};
#[cfg(test)]
pub use enrollment_repository::MockEnrollmentRepository;
pub use enrollment_repository::{
    EnrollmentRepository, EnrollmentRepositoryError, FixtureEnrollmentRepository,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{FixturePasswordHasher, PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use text_generator::MockTextGenerator;
pub use text_generator::{
    DisabledTextGenerator, GenerationRequest, TextGenerator, TextGeneratorError,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    FixtureUserRepository, StoredAccount, UserPersistenceError, UserRepository,
};
