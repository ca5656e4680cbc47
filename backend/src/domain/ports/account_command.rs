//! Driving ports for account registration, login, and profile management.
//!
//! Inbound adapters call these to authenticate users without knowing how
//! accounts or password digests are stored.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, ProfilePatch, Registration, User, UserId};

/// Account write use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account. Fails with a business-rule error when the email is
    /// already registered.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Validate credentials and return the authenticated user.
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Update the caller's own profile fields.
    async fn update_profile(&self, user_id: &UserId, patch: ProfilePatch) -> Result<User, Error>;
}

/// Account read use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Return the profile for `user_id`.
    async fn profile(&self, user_id: &UserId) -> Result<User, Error>;
}
