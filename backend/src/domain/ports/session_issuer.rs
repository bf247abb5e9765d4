//! Port for bearer session tokens.

use chrono::{DateTime, Utc};

use crate::domain::{Error, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session issuer adapters.
    pub enum SessionError {
        /// The token is malformed or its signature does not verify.
        Invalid { message: String } => "invalid session token: {message}",
        /// The token has passed its expiry.
        Expired => "session token expired",
        /// Signing a new token failed.
        Signing { message: String } => "session token signing failed: {message}",
    }
}

/// Map session failures to domain errors.
#[must_use]
pub fn map_session_error(error: SessionError) -> Error {
    match error {
        SessionError::Invalid { .. } | SessionError::Expired => {
            Error::unauthorized("Invalid or expired token")
        }
        SessionError::Signing { message } => {
            tracing::error!(%message, "session token signing failed");
            Error::internal(message)
        }
    }
}

/// Signed bearer token handed to a client.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Encoded token for the `Authorization: Bearer` header.
    pub access_token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Mint and resolve session tokens carrying a user identity.
#[cfg_attr(test, mockall::automock)]
pub trait SessionIssuer: Send + Sync {
    /// Issue a token for `user`.
    fn issue(&self, user: &UserId) -> Result<SessionToken, SessionError>;

    /// Resolve a token back to the user it was issued for.
    fn resolve(&self, token: &str) -> Result<UserId, SessionError>;
}
