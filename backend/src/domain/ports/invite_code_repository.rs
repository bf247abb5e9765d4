//! Port for invite code persistence.
//!
//! Redemption is a single conditional write: adapters re-check the validity
//! predicate and apply [`InviteCode::redeemed`] atomically, so concurrent
//! redemptions can never push `used_count` past `max_uses`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Error, InviteCode, InviteCodeValue, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by invite code repository adapters.
    pub enum InviteCodePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "invite code repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "invite code repository query failed: {message}",
        /// A code with the same value already exists.
        DuplicateCode { code: String } => "invite code already exists: {code}",
    }
}

/// Map persistence failures to domain errors.
#[must_use]
pub fn map_invite_persistence_error(error: InviteCodePersistenceError) -> Error {
    match error {
        InviteCodePersistenceError::Connection { message } => {
            tracing::warn!(%message, "invite code repository unavailable");
            Error::service_unavailable("directory store unavailable")
        }
        InviteCodePersistenceError::Query { message } => {
            tracing::error!(%message, "invite code repository query failed");
            Error::internal(message)
        }
        InviteCodePersistenceError::DuplicateCode { .. } => {
            Error::internal("invite code collision")
        }
    }
}

/// Invite Ledger storage contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InviteCodeRepository: Send + Sync {
    /// Persist a newly issued code.
    async fn insert(&self, code: &InviteCode) -> Result<(), InviteCodePersistenceError>;

    /// Look up a code by value, including revoked and exhausted codes.
    async fn find_by_code(
        &self,
        code: &InviteCodeValue,
    ) -> Result<Option<InviteCode>, InviteCodePersistenceError>;

    /// Codes minted by `issuer`, newest first.
    async fn list_by_issuer(
        &self,
        issuer: &UserId,
    ) -> Result<Vec<InviteCode>, InviteCodePersistenceError>;

    /// Clear the active flag on a code owned by `issuer`.
    ///
    /// Returns `None` when the code does not exist or belongs to someone else.
    async fn deactivate(
        &self,
        code: &InviteCodeValue,
        issuer: &UserId,
    ) -> Result<Option<InviteCode>, InviteCodePersistenceError>;

    /// Atomically consume one use of a valid code on behalf of an existing
    /// user.
    ///
    /// Returns `None` when the code is missing or fails the validity predicate
    /// at `now`.
    async fn redeem(
        &self,
        code: &InviteCodeValue,
        redeemer: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<InviteCode>, InviteCodePersistenceError>;
}
