//! Port abstraction for the Identity Store and its errors.
//!
//! Adapters persist [`User`] records and enforce email uniqueness; a
//! duplicate surfaces as [`UserPersistenceError::DuplicateEmail`] so callers
//! can map it to a conflict without inspecting driver errors.

use async_trait::async_trait;

use crate::domain::{Email, Error, Role, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user already holds the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
        /// The record to update does not exist.
        Missing { id: String } => "user not found: {id}",
        /// The user issued invite codes, which keep their issuer for life.
        IssuedInvites { id: String } => "user has issued invite codes: {id}",
    }
}

/// Map persistence failures to domain errors.
///
/// Connection problems surface as `503`, a duplicate email as a conflict and a
/// vanished record as not found; everything else is an opaque internal error.
#[must_use]
pub fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            tracing::warn!(%message, "user repository unavailable");
            Error::service_unavailable("directory store unavailable")
        }
        UserPersistenceError::Query { message } => {
            tracing::error!(%message, "user repository query failed");
            Error::internal(message)
        }
        UserPersistenceError::DuplicateEmail { .. } => Error::conflict("Email already registered"),
        UserPersistenceError::Missing { .. } => Error::not_found("User not found"),
        UserPersistenceError::IssuedInvites { .. } => {
            Error::conflict("User has issued invite codes and cannot be deleted")
        }
    }
}

/// Identity Store contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by exact, case-sensitive email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a new user.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Replace every mutable field of an existing user.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Delete a user, clearing the manager link on their reports and the
    /// first-redeemer link on invite codes. Fails with
    /// [`UserPersistenceError::IssuedInvites`] while any code names the user as
    /// issuer; codes are never removed. Returns `false` when no such user
    /// existed.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// All users, oldest first.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Users holding `role`, oldest first.
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserPersistenceError>;

    /// Direct reports of `manager`, oldest first.
    async fn list_by_manager(&self, manager: &UserId) -> Result<Vec<User>, UserPersistenceError>;
}
