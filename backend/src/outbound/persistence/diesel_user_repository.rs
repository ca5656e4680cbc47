//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Emails are stored in their normalised (lower-case) form and a unique index
//! enforces one account per address; a collision surfaces as
//! [`UserPersistenceError::DuplicateEmail`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StoredAccount, UserPersistenceError, UserRepository};
use crate::domain::{DisplayName, Email, PasswordHash, Role, User, UserDraft, UserId};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{AccountRow, NewUserRow, ProfileUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, email: Option<&Email>) -> UserPersistenceError {
    match classify_diesel_error(error, "user repository") {
        DieselFailure::UniqueViolation { .. } => UserPersistenceError::duplicate_email(
            email.map(ToString::to_string).unwrap_or_default(),
        ),
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::ForeignKeyViolation { .. } => {
            UserPersistenceError::query("foreign key violation")
        }
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn query_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(error, None)
}

/// Convert a database row to a domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let invalid = |err: crate::domain::UserValidationError| {
        UserPersistenceError::query(format!("stored user {} is invalid: {err}", row.id))
    };
    Ok(User::new(UserDraft {
        id: UserId::from_uuid(row.id),
        name: DisplayName::new(row.name.clone()).map_err(invalid)?,
        email: Email::new(&row.email).map_err(invalid)?,
        role: row.role.parse::<Role>().map_err(invalid)?,
        avatar: row.avatar,
        bio: row.bio,
        created_at: row.created_at,
    }))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &StoredAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &account.user;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_hash: account.password_hash.as_str(),
            role: user.role().as_str(),
            avatar: user.avatar(),
            bio: user.bio(),
            created_at: user.created_at(),
            updated_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, Some(user.email())))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let email_text: &str = email.as_ref();

        let row: Option<AccountRow> = users::table
            .filter(users::email.eq(email_text))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error)?;

        row.map(|row| {
            Ok(StoredAccount {
                user: row_to_user(row.user)?,
                password_hash: PasswordHash::new(row.password_hash),
            })
        })
        .transpose()
    }

    async fn update_profile(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = ProfileUpdate {
            name: user.name().as_ref(),
            avatar: user.avatar(),
            bio: user.bio(),
        };

        let updated = diesel::update(users::table.filter(users::id.eq(user.id().as_uuid())))
            .set((&changes, users::updated_at.eq(diesel::dsl::now)))
            .execute(&mut conn)
            .await
            .map_err(query_error)?;

        if updated == 0 {
            return Err(UserPersistenceError::query(format!(
                "user {} not found for update",
                user.id()
            )));
        }
        Ok(())
    }
}
