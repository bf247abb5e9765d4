//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Email uniqueness is enforced by the `users_email_key` constraint. Deleting
//! a user clears their reports' manager link through `ON DELETE SET NULL`;
//! the invite issuer key is `RESTRICT`, so a user who issued codes stays.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, Role, User, UserId};

use super::diesel_helpers::{StoreFailure, classify_diesel_error, classify_pool_error, collect_rows};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::DbPool;
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";
const ISSUER_CONSTRAINT: &str = "invite_codes_issuer_fkey";

/// Diesel-backed implementation of the Identity Store.
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

fn to_port_error(failure: StoreFailure, email: Option<&Email>) -> UserPersistenceError {
    if failure.violates(EMAIL_CONSTRAINT) {
        let email = email.map_or_else(String::new, ToString::to_string);
        return UserPersistenceError::duplicate_email(email);
    }
    match failure {
        StoreFailure::Connection(message) => UserPersistenceError::connection(message),
        other => UserPersistenceError::query(other.into_message()),
    }
}

fn map_delete_error(error: diesel::result::Error, id: &UserId) -> UserPersistenceError {
    let failure = classify_diesel_error(error);
    if failure.still_referenced_by(ISSUER_CONSTRAINT) {
        return UserPersistenceError::issued_invites(id.to_string());
    }
    to_port_error(failure, None)
}

fn map_pool_error(error: super::pool::PoolError) -> UserPersistenceError {
    to_port_error(classify_pool_error(error), None)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    to_port_error(classify_diesel_error(error), None)
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserPersistenceError> {
    collect_rows(rows, UserRow::into_domain).map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(UserRow::into_domain)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(UserRow::into_domain)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| to_port_error(classify_diesel_error(error), Some(&user.email)))
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(users::table.filter(users::id.eq(user.id.as_uuid())))
            .set(UserUpdate::from(user))
            .execute(&mut conn)
            .await
            .map_err(|error| to_port_error(classify_diesel_error(error), Some(&user.email)))?;

        if updated == 0 {
            return Err(UserPersistenceError::missing(user.id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.filter(users::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(|error| map_delete_error(error, id))?;

        Ok(deleted > 0)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_users(rows)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(users::role.eq(role.as_str()))
            .order((users::created_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_users(rows)
    }

    async fn list_by_manager(&self, manager: &UserId) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(users::manager_id.eq(manager.as_uuid()))
            .order((users::created_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_users(rows)
    }
}
