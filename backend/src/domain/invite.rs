//! Invite codes: capability tokens that gate self-registration.
//!
//! A code is valid while it is active, unexpired and below its use cap. The
//! transition applied by a redemption lives here as a pure function so every
//! store adapter applies identical accounting.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use serde_json::json;

use super::Error;
use super::user::UserId;

/// Alphabet used for generated codes; omits the look-alikes `I`, `L`, `O`,
/// `0` and `1`.
pub const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
/// Length of generated codes.
pub const INVITE_CODE_LENGTH: usize = 10;
/// Longest code accepted on input.
pub const INVITE_CODE_MAX_LEN: usize = 32;
/// Expiry applied when the issuer does not choose one.
pub const DEFAULT_EXPIRY_DAYS: i64 = 90;
/// Longest expiry an issuer may request.
pub const MAX_EXPIRY_DAYS: i64 = 3650;

/// Validation failures for invite inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InviteValidationError {
    /// The code was blank.
    #[error("invite code must not be empty")]
    EmptyCode,
    /// The code contains characters outside `[A-Z0-9]` or is too long.
    #[error("invite code is malformed")]
    MalformedCode,
    /// A negative expiry was requested.
    #[error("expires_in_days must not be negative")]
    NegativeExpiry,
    /// The requested expiry exceeds [`MAX_EXPIRY_DAYS`].
    #[error("expires_in_days must be at most {max}")]
    ExpiryTooLong {
        /// Maximum accepted value.
        max: i64,
    },
    /// The requested use cap does not fit the store.
    #[error("max_uses is too large")]
    MaxUsesTooLarge,
    /// An explicit expiry instant is not in the future.
    #[error("expires_at must be in the future")]
    ExpiryInPast,
    /// Both an expiry instant and a day count were given.
    #[error("give either expires_at or expires_in_days, not both")]
    ConflictingExpiry,
}

impl From<InviteValidationError> for Error {
    fn from(value: InviteValidationError) -> Self {
        let field = match value {
            InviteValidationError::EmptyCode | InviteValidationError::MalformedCode => "code",
            InviteValidationError::NegativeExpiry | InviteValidationError::ExpiryTooLong { .. } => {
                "expires_in_days"
            }
            InviteValidationError::MaxUsesTooLarge => "max_uses",
            InviteValidationError::ExpiryInPast | InviteValidationError::ConflictingExpiry => {
                "expires_at"
            }
        };
        Self::invalid_request(value.to_string()).with_details(json!({ "field": field }))
    }
}

/// Normalised invite code text.
///
/// Input is trimmed and uppercased, so redemption is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InviteCodeValue(String);

impl InviteCodeValue {
    /// Normalise and validate user-supplied code text.
    ///
    /// # Examples
    /// ```
    /// use staff_directory::domain::InviteCodeValue;
    ///
    /// let code = InviteCodeValue::parse(" abcd123456 ").expect("valid code");
    /// assert_eq!(code.as_ref(), "ABCD123456");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, InviteValidationError> {
        let normalised = raw.trim().to_ascii_uppercase();
        if normalised.is_empty() {
            return Err(InviteValidationError::EmptyCode);
        }
        if normalised.len() > INVITE_CODE_MAX_LEN
            || !normalised.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(InviteValidationError::MalformedCode);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for InviteCodeValue {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for InviteCodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh invite code values.
#[cfg_attr(test, mockall::automock)]
pub trait InviteCodeGenerator: Send + Sync {
    /// Produce a candidate code; uniqueness is checked by the caller.
    fn generate(&self) -> InviteCodeValue;
}

/// Generator drawing uniformly from [`INVITE_CODE_ALPHABET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomInviteCodeGenerator;

impl InviteCodeGenerator for RandomInviteCodeGenerator {
    fn generate(&self) -> InviteCodeValue {
        let mut rng = rand::thread_rng();
        let code = (0..INVITE_CODE_LENGTH)
            .filter_map(|_| INVITE_CODE_ALPHABET.choose(&mut rng))
            .map(|byte| char::from(*byte))
            .collect();
        InviteCodeValue(code)
    }
}

/// Issuer-supplied invite options before normalisation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InviteRequest {
    /// Requested use cap; `None` and values below one mean a single use.
    pub max_uses: Option<i64>,
    /// Explicit opt-in to an uncapped code; overrides `max_uses`.
    pub unlimited: bool,
    /// Days until expiry; `None` means the default, zero means never.
    pub expires_in_days: Option<i64>,
    /// Exact expiry instant; excludes `expires_in_days`.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Normalised invite terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InviteTerms {
    /// Use cap; `None` is unlimited.
    pub max_uses: Option<u32>,
    /// Expiry instant; `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl InviteRequest {
    /// Resolve defaults and validate against `now`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use staff_directory::domain::InviteRequest;
    ///
    /// let terms = InviteRequest::default().terms(Utc::now()).unwrap();
    /// assert_eq!(terms.max_uses, Some(1));
    /// assert!(terms.expires_at.is_some());
    /// ```
    pub fn terms(&self, now: DateTime<Utc>) -> Result<InviteTerms, InviteValidationError> {
        let max_uses = if self.unlimited {
            None
        } else {
            match self.max_uses {
                Some(requested) if requested > 1 => Some(
                    u32::try_from(requested)
                        .ok()
                        .filter(|value| i32::try_from(*value).is_ok())
                        .ok_or(InviteValidationError::MaxUsesTooLarge)?,
                ),
                _ => Some(1),
            }
        };

        if let Some(expires_at) = self.expires_at {
            if self.expires_in_days.is_some() {
                return Err(InviteValidationError::ConflictingExpiry);
            }
            if expires_at <= now {
                return Err(InviteValidationError::ExpiryInPast);
            }
            return Ok(InviteTerms {
                max_uses,
                expires_at: Some(expires_at),
            });
        }

        let days = self.expires_in_days.unwrap_or(DEFAULT_EXPIRY_DAYS);
        if days < 0 {
            return Err(InviteValidationError::NegativeExpiry);
        }
        if days > MAX_EXPIRY_DAYS {
            return Err(InviteValidationError::ExpiryTooLong {
                max: MAX_EXPIRY_DAYS,
            });
        }
        let expires_at = if days == 0 {
            None
        } else {
            Some(now + Duration::days(days))
        };

        Ok(InviteTerms {
            max_uses,
            expires_at,
        })
    }
}

/// Persisted invite code record.
///
/// ## Invariants
/// - `used_count <= max_uses` whenever `max_uses` is set.
/// - Once `is_active` is false it never becomes true again.
/// - `first_redeemer_id` is written at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteCode {
    /// Code text.
    pub code: InviteCodeValue,
    /// Manager or HR user who minted the code.
    pub issuer_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry instant; `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Use cap; `None` is unlimited.
    pub max_uses: Option<u32>,
    /// Successful redemptions so far.
    pub used_count: u32,
    /// Time of the most recent redemption.
    pub last_used_at: Option<DateTime<Utc>>,
    /// First user who redeemed the code.
    pub first_redeemer_id: Option<UserId>,
    /// Cleared by revocation or by reaching the use cap.
    pub is_active: bool,
}

impl InviteCode {
    /// Build a fresh, unused code.
    #[must_use]
    pub const fn issue(
        code: InviteCodeValue,
        issuer_id: UserId,
        terms: InviteTerms,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            issuer_id,
            created_at: now,
            expires_at: terms.expires_at,
            max_uses: terms.max_uses,
            used_count: 0,
            last_used_at: None,
            first_redeemer_id: None,
            is_active: true,
        }
    }

    /// Evaluate the validity predicate at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.expires_at.is_none_or(|expiry| now < expiry)
            && self.max_uses.is_none_or(|cap| self.used_count < cap)
    }

    /// Redemptions left before the cap; `None` when uncapped.
    #[must_use]
    pub fn remaining_uses(&self) -> Option<u32> {
        self.max_uses
            .map(|cap| cap.saturating_sub(self.used_count))
    }

    /// Apply one redemption, or return `None` when the code is not valid.
    ///
    /// `redeemer` is recorded only if no redeemer has been recorded yet. The
    /// code deactivates when the post-increment count reaches the cap.
    #[must_use]
    pub fn redeemed(&self, redeemer: Option<UserId>, now: DateTime<Utc>) -> Option<Self> {
        if !self.is_valid_at(now) {
            return None;
        }
        let used_count = self.used_count.checked_add(1)?;
        let mut next = self.clone();
        next.used_count = used_count;
        next.last_used_at = Some(now);
        if next.first_redeemer_id.is_none() {
            next.first_redeemer_id = redeemer;
        }
        if next.max_uses.is_some_and(|cap| used_count >= cap) {
            next.is_active = false;
        }
        Some(next)
    }
}
