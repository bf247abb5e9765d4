//! Login and self-service profile management.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use super::ports::{
    PasswordHasher, SessionIssuer, SessionToken, UserRepository, hash_blocking,
    map_session_error, map_user_persistence_error, verify_blocking,
};
use super::user::{ADDRESS_MAX, NAME_MAX, optional_text};
use super::{
    AuthorizationGuard, Email, Error, LoginCredentials, Password, PasswordHash, User, UserId,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Argon2id hash at the library's default cost that matches no password.
///
/// Logins for unknown emails verify against it so they take as long as a
/// wrong password does.
const DECOY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
                          AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// A user together with a freshly issued session.
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// Authenticated user.
    pub user: User,
    /// Session token.
    pub session: SessionToken,
}

/// Password rotation request.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    /// Password currently on record.
    pub current: Password,
    /// Replacement, policy-checked by the service.
    pub new: Password,
}

/// Self-service profile changes. `None` leaves a field untouched; a blank
/// string clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Password rotation.
    pub password: Option<PasswordChange>,
}

/// Account service: login, profile read and self-service update.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    sessions: Arc<dyn SessionIssuer>,
    guard: AuthorizationGuard,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Assemble the service from its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        sessions: Arc<dyn SessionIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            guard: AuthorizationGuard::new(users.clone()),
            users,
            hasher,
            sessions,
            clock,
        }
    }

    /// Exchange credentials for a session.
    ///
    /// Unknown emails, malformed emails and wrong passwords produce the same
    /// error, and an unknown email still pays for one hash verification.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<SignedIn, Error> {
        let user = match Email::parse(credentials.email()) {
            Ok(email) => self
                .users
                .find_by_email(&email)
                .await
                .map_err(map_user_persistence_error)?,
            Err(_) => None,
        };
        let Some(user) = user else {
            debug!("login for unknown email");
            let decoy = PasswordHash::new(DECOY_HASH.to_owned());
            verify_blocking(&self.hasher, credentials.password(), &decoy).await;
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !verify_blocking(&self.hasher, credentials.password(), &user.password_hash).await {
            debug!(user_id = %user.id, "login with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        let session = self.sessions.issue(&user.id).map_err(map_session_error)?;
        info!(user_id = %user.id, "user logged in");
        Ok(SignedIn { user, session })
    }

    /// The caller's own record.
    pub async fn profile(&self, caller: &UserId) -> Result<User, Error> {
        self.guard.authenticate(caller).await
    }

    /// Apply self-service changes to the caller's record.
    pub async fn update_profile(
        &self,
        caller: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let mut user = self.guard.authenticate(caller).await?;

        if let Some(first_name) = update.first_name {
            user.profile.first_name = optional_text("first_name", Some(first_name), NAME_MAX)?;
        }
        if let Some(last_name) = update.last_name {
            user.profile.last_name = optional_text("last_name", Some(last_name), NAME_MAX)?;
        }
        if let Some(address) = update.address {
            user.profile.address = optional_text("address", Some(address), ADDRESS_MAX)?;
        }
        if let Some(date_of_birth) = update.date_of_birth {
            user.profile.date_of_birth = Some(date_of_birth);
        }
        if let Some(change) = update.password {
            if !verify_blocking(&self.hasher, &change.current, &user.password_hash).await {
                return Err(Error::invalid_request("Current password is incorrect")
                    .with_details(json!({ "field": "current_password" })));
            }
            change.new.check_policy()?;
            user.password_hash =
                hash_blocking(&self.hasher, &change.new)
                    .await
                    .map_err(|error| {
                        tracing::error!(%error, "password hashing failed");
                        Error::internal(error.to_string())
                    })?;
        }

        user.updated_at = self.clock.utc();
        self.users
            .update(&user)
            .await
            .map_err(map_user_persistence_error)?;
        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }
}
