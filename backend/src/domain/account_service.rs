//! Account registration, login, and profile service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    AccountCommand, AccountQuery, PasswordHasher, StoredAccount, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, ProfilePatch, Registration, User, UserDraft, UserId,
};

/// Business rule raised when registering an email that is already in use.
pub const EMAIL_TAKEN_RULE: &str = "email_taken";

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account service over the user repository and a password hasher.
#[derive(Clone)]
pub struct AccountService<U: ?Sized, H: ?Sized> {
    users: Arc<U>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U: ?Sized, H: ?Sized> AccountService<U, H> {
    pub fn new(users: Arc<U>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::business_rule(EMAIL_TAKEN_RULE, "email is already registered")
        }
    }
}

impl<U: ?Sized, H: ?Sized> AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn load(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[async_trait]
impl<U: ?Sized, H: ?Sized> AccountCommand for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(|err| Error::internal(err.to_string()))?;
        let user = User::new(UserDraft {
            id: UserId::random(),
            name: registration.name().clone(),
            email: registration.email().clone(),
            role: registration.role(),
            avatar: String::new(),
            bio: String::new(),
            created_at: self.clock.utc(),
        });
        let account = StoredAccount {
            user,
            password_hash,
        };
        self.users.insert(&account).await.map_err(map_user_error)?;
        info!(user_id = %account.user.id(), role = account.user.role().as_str(), "account registered");
        Ok(account.user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let account = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;
        if !self
            .hasher
            .verify(credentials.password(), &account.password_hash)
        {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(account.user)
    }

    async fn update_profile(&self, user_id: &UserId, patch: ProfilePatch) -> Result<User, Error> {
        let mut user = self.load(user_id).await?;
        user.apply_profile(patch);
        self.users
            .update_profile(&user)
            .await
            .map_err(map_user_error)?;
        Ok(user)
    }
}

#[async_trait]
impl<U: ?Sized, H: ?Sized> AccountQuery for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.load(user_id).await
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
