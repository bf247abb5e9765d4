//! Port for the registration unit of work.
//!
//! Enrollment couples invite redemption with user creation: either the code
//! is consumed and the user exists, or neither happened.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Error, InviteCode, InviteCodeValue, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised while committing an enrollment.
    pub enum EnrollmentError {
        /// Repository connection could not be established.
        Connection { message: String } => "enrollment connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "enrollment query failed: {message}",
        /// Another user already holds the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
        /// The invite code failed the validity predicate at commit time.
        InviteUnavailable { code: String } => "invite code unavailable: {code}",
    }
}

/// Map enrollment failures to domain errors.
#[must_use]
pub fn map_enrollment_error(error: EnrollmentError) -> Error {
    match error {
        EnrollmentError::Connection { message } => {
            tracing::warn!(%message, "enrollment store unavailable");
            Error::service_unavailable("directory store unavailable")
        }
        EnrollmentError::Query { message } => {
            tracing::error!(%message, "enrollment failed");
            Error::internal(message)
        }
        EnrollmentError::DuplicateEmail { .. } => Error::conflict("Email already registered"),
        EnrollmentError::InviteUnavailable { .. } => {
            Error::invalid_invite("Invalid or expired invite code")
        }
    }
}

/// A pending registration.
#[derive(Debug, Clone)]
pub struct Enrollment {
    /// Fully built user record to insert.
    pub user: User,
    /// Code to consume in the same transaction, if any.
    pub invite: Option<InviteCodeValue>,
    /// Instant used for the validity re-check and `last_used_at`.
    pub at: DateTime<Utc>,
}

/// Registration transaction contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Redeem the invite (when present), insert the user and record them as
    /// first redeemer, all in one transaction.
    ///
    /// Returns the post-redemption code when one was consumed.
    async fn enroll(
        &self,
        enrollment: &Enrollment,
    ) -> Result<Option<InviteCode>, EnrollmentError>;
}
