//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, PasswordHash, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Stored account: the public user plus its password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    pub user: User,
    pub password_hash: PasswordHash,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Fails with
    /// [`UserPersistenceError::DuplicateEmail`] when the email is taken.
    async fn insert(&self, account: &StoredAccount) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account, digest included, by normalised email.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredAccount>, UserPersistenceError>;

    /// Persist profile fields (name, bio, avatar) for an existing user.
    async fn update_profile(&self, user: &User) -> Result<(), UserPersistenceError>;
}

/// Fixture repository that stores nothing and finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn insert(&self, _account: &StoredAccount) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn find_by_email(
        &self,
        _email: &Email,
    ) -> Result<Option<StoredAccount>, UserPersistenceError> {
        Ok(None)
    }

    async fn update_profile(&self, _user: &User) -> Result<(), UserPersistenceError> {
        Ok(())
    }
}
