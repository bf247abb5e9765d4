//! Invite Ledger: mints, lists, revokes, validates and redeems invite codes.
//!
//! The ledger owns the lifecycle rules; the repository only persists records
//! and performs the atomic conditional redemption.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info, warn};

use super::ports::{
    InviteCodePersistenceError, InviteCodeRepository, UserRepository,
    map_invite_persistence_error, map_user_persistence_error,
};
use super::{
    AuthorizationGuard, Error, InviteCode, InviteCodeGenerator, InviteCodeValue, InviteRequest,
    Role, UserId,
};

/// Bound on code generation attempts before giving up.
pub const MAX_GENERATION_ATTEMPTS: usize = 8;

/// Message returned for every failed validity check.
pub const INVALID_INVITE_MESSAGE: &str = "Invalid or expired invite code";

const INVITE_NOT_FOUND_MESSAGE: &str = "Invite code not found";

const CODE_TAKEN_MESSAGE: &str = "Invite code already exists";

/// Roles allowed to mint and manage invite codes.
pub const INVITE_ISSUER_ROLES: &[Role] = &[Role::Manager, Role::Hr];

/// Invite Ledger service.
#[derive(Clone)]
pub struct InviteLedger {
    codes: Arc<dyn InviteCodeRepository>,
    users: Arc<dyn UserRepository>,
    guard: AuthorizationGuard,
    generator: Arc<dyn InviteCodeGenerator>,
    clock: Arc<dyn Clock>,
}

impl InviteLedger {
    /// Assemble the ledger from its ports.
    pub fn new(
        codes: Arc<dyn InviteCodeRepository>,
        users: Arc<dyn UserRepository>,
        generator: Arc<dyn InviteCodeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codes,
            guard: AuthorizationGuard::new(users.clone()),
            users,
            generator,
            clock,
        }
    }

    /// Mint a code on behalf of an authenticated Manager or HR caller.
    pub async fn issue(&self, issuer: &UserId, request: InviteRequest) -> Result<InviteCode, Error> {
        let issuer = self.guard.require(issuer, INVITE_ISSUER_ROLES).await?;
        self.mint(&issuer.id, request).await
    }

    /// Mint a code for `manager` from a trusted internal caller.
    ///
    /// A `chosen` value is used as given after normalisation. Code values are
    /// never reused, so one that exists already, revoked or not, is a
    /// conflict.
    pub async fn issue_on_behalf(
        &self,
        manager: &UserId,
        request: InviteRequest,
        chosen: Option<&str>,
    ) -> Result<InviteCode, Error> {
        let user = self
            .users
            .find_by_id(manager)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("Manager not found"))?;
        if user.role != Role::Manager {
            return Err(Error::invalid_request("Assigned user is not a manager"));
        }
        match chosen.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => self.mint_chosen(&user.id, raw, request).await,
            None => self.mint(&user.id, request).await,
        }
    }

    async fn mint_chosen(
        &self,
        issuer: &UserId,
        raw: &str,
        request: InviteRequest,
    ) -> Result<InviteCode, Error> {
        let value = InviteCodeValue::parse(raw)?;
        let now = self.clock.utc();
        let code = InviteCode::issue(value, *issuer, request.terms(now)?, now);
        match self.codes.insert(&code).await {
            Ok(()) => {
                log_issued(&code);
                Ok(code)
            }
            Err(InviteCodePersistenceError::DuplicateCode { .. }) => {
                debug!(code = %code.code, "chosen invite code already exists");
                Err(Error::conflict(CODE_TAKEN_MESSAGE))
            }
            Err(other) => Err(map_invite_persistence_error(other)),
        }
    }

    async fn mint(&self, issuer: &UserId, request: InviteRequest) -> Result<InviteCode, Error> {
        let now = self.clock.utc();
        let terms = request.terms(now)?;

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let candidate = self.generator.generate();
            if self
                .codes
                .find_by_code(&candidate)
                .await
                .map_err(map_invite_persistence_error)?
                .is_some()
            {
                debug!(attempt, "generated invite code already taken");
                continue;
            }

            let code = InviteCode::issue(candidate, *issuer, terms, now);
            match self.codes.insert(&code).await {
                Ok(()) => {
                    log_issued(&code);
                    return Ok(code);
                }
                Err(InviteCodePersistenceError::DuplicateCode { .. }) => {
                    debug!(attempt, "invite code insert collided");
                }
                Err(other) => return Err(map_invite_persistence_error(other)),
            }
        }

        warn!(
            attempts = MAX_GENERATION_ATTEMPTS,
            "could not allocate a unique invite code"
        );
        Err(Error::internal("could not allocate a unique invite code"))
    }

    /// The caller's own codes, newest first.
    pub async fn list(&self, issuer: &UserId) -> Result<Vec<InviteCode>, Error> {
        let issuer = self.guard.require(issuer, INVITE_ISSUER_ROLES).await?;
        self.codes
            .list_by_issuer(&issuer.id)
            .await
            .map_err(map_invite_persistence_error)
    }

    /// Deactivate a code owned by the caller.
    ///
    /// Missing codes and codes owned by someone else are indistinguishable.
    /// Revoking an already inactive code succeeds without change.
    pub async fn revoke(&self, issuer: &UserId, raw_code: &str) -> Result<InviteCode, Error> {
        let issuer = self.guard.require(issuer, INVITE_ISSUER_ROLES).await?;
        let code =
            InviteCodeValue::parse(raw_code).map_err(|_| Error::not_found(INVITE_NOT_FOUND_MESSAGE))?;
        let revoked = self
            .codes
            .deactivate(&code, &issuer.id)
            .await
            .map_err(map_invite_persistence_error)?
            .ok_or_else(|| Error::not_found(INVITE_NOT_FOUND_MESSAGE))?;
        info!(issuer_id = %issuer.id, "invite code revoked");
        Ok(revoked)
    }

    /// Read-only validity check.
    pub async fn validate(&self, raw_code: &str) -> Result<InviteCode, Error> {
        let Ok(code) = InviteCodeValue::parse(raw_code) else {
            return Err(Error::invalid_invite(INVALID_INVITE_MESSAGE));
        };
        let now = self.clock.utc();
        self.codes
            .find_by_code(&code)
            .await
            .map_err(map_invite_persistence_error)?
            .filter(|found| found.is_valid_at(now))
            .ok_or_else(|| Error::invalid_invite(INVALID_INVITE_MESSAGE))
    }

    /// Fetch a code regardless of validity.
    pub async fn find(&self, raw_code: &str) -> Result<InviteCode, Error> {
        let code =
            InviteCodeValue::parse(raw_code).map_err(|_| Error::not_found(INVITE_NOT_FOUND_MESSAGE))?;
        self.codes
            .find_by_code(&code)
            .await
            .map_err(map_invite_persistence_error)?
            .ok_or_else(|| Error::not_found(INVITE_NOT_FOUND_MESSAGE))
    }

    /// Display name of the user who issued `code`: their full name, or their
    /// email when they have none. `None` if the issuer cannot be found.
    pub async fn issuer_name(&self, code: &InviteCode) -> Result<Option<String>, Error> {
        let issuer = self
            .users
            .find_by_id(&code.issuer_id)
            .await
            .map_err(map_user_persistence_error)?;
        Ok(issuer.map(|user| user.display_name()))
    }

    /// Consume one use of a code on behalf of an existing user.
    pub async fn redeem(&self, raw_code: &str, redeemer: &UserId) -> Result<InviteCode, Error> {
        let Ok(code) = InviteCodeValue::parse(raw_code) else {
            return Err(Error::invalid_invite(INVALID_INVITE_MESSAGE));
        };
        let user = self
            .users
            .find_by_id(redeemer)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;
        let redeemed = self
            .codes
            .redeem(&code, &user.id, self.clock.utc())
            .await
            .map_err(map_invite_persistence_error)?
            .ok_or_else(|| Error::invalid_invite(INVALID_INVITE_MESSAGE))?;
        info!(
            redeemer_id = %user.id,
            used_count = redeemed.used_count,
            active = redeemed.is_active,
            "invite code redeemed"
        );
        Ok(redeemed)
    }
}

fn log_issued(code: &InviteCode) {
    info!(
        issuer_id = %code.issuer_id,
        max_uses = ?code.max_uses,
        expires_at = ?code.expires_at,
        "invite code issued"
    );
}

#[cfg(test)]
#[path = "invite_ledger_tests.rs"]
mod tests;
