//! Directory user model.
//!
//! A [`User`] is the unit the Identity Store persists. Construction helpers
//! here validate individual fields; cross-record rules (manager role, email
//! uniqueness) are enforced by the services that own them.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde_json::json;
use uuid::Uuid;

use super::Error;
use super::role::Role;

/// Maximum stored length of an email address.
pub const EMAIL_MAX: usize = 120;
/// Maximum stored length of first and last names.
pub const NAME_MAX: usize = 50;
/// Maximum stored length of a department name.
pub const DEPARTMENT_MAX: usize = 100;
/// Maximum stored length of a postal address.
pub const ADDRESS_MAX: usize = 200;

/// Validation errors raised while building user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier is not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The email address is missing.
    #[error("email is required")]
    EmptyEmail,
    /// The email address is malformed.
    #[error("invalid email format")]
    InvalidEmail,
    /// The email address exceeds the stored length.
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// A free-text profile field exceeds its stored length.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// Offending field name.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },
}

impl UserValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyEmail | Self::InvalidEmail | Self::EmailTooLong { .. } => "email",
            Self::FieldTooLong { field, .. } => field,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_uuid",
            Self::EmptyEmail => "missing_field",
            Self::InvalidEmail => "invalid_email",
            Self::EmailTooLong { .. } | Self::FieldTooLong { .. } => "too_long",
        }
    }
}

impl From<UserValidationError> for Error {
    fn from(value: UserValidationError) -> Self {
        Self::invalid_request(value.to_string()).with_details(json!({
            "field": value.field(),
            "code": value.code(),
        }))
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validated email address.
///
/// Surrounding whitespace is trimmed; comparison is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    ///
    /// # Examples
    /// ```
    /// use staff_directory::domain::Email;
    ///
    /// let email = Email::parse("  a@x.com ").expect("valid email");
    /// assert_eq!(email.as_ref(), "a@x.com");
    /// assert!(Email::parse("not-an-email").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque password credential produced by a password hasher.
///
/// The value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash string.
    #[must_use]
    pub const fn new(encoded: String) -> Self {
        Self(encoded)
    }

    /// Encoded hash for storage and verification.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Optional personal and work details attached to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Department the user works in.
    pub department: Option<String>,
    /// Postal address; only exposed in sensitive views.
    pub address: Option<String>,
    /// Date of birth; only exposed in sensitive views.
    pub date_of_birth: Option<NaiveDate>,
}

/// Normalise an optional free-text field.
///
/// Blank input becomes `None`; surrounding whitespace is trimmed.
pub fn optional_text(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, UserValidationError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max {
        return Err(UserValidationError::FieldTooLong { field, max });
    }
    Ok(Some(trimmed.to_owned()))
}

/// Raw profile input prior to validation.
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
}

impl ProfileInput {
    /// Validate every field and produce a [`UserProfile`].
    pub fn validate(self) -> Result<UserProfile, UserValidationError> {
        Ok(UserProfile {
            first_name: optional_text("first_name", self.first_name, NAME_MAX)?,
            last_name: optional_text("last_name", self.last_name, NAME_MAX)?,
            department: optional_text("department", self.department, DEPARTMENT_MAX)?,
            address: optional_text("address", self.address, ADDRESS_MAX)?,
            date_of_birth: self.date_of_birth,
        })
    }
}

/// Directory user record.
///
/// ## Invariants
/// - `email` is unique across the store.
/// - When set, `manager_id` references a user whose role is
///   [`Role::Manager`] at assignment time, and never `id` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Primary identifier.
    pub id: UserId,
    /// Login email.
    pub email: Email,
    /// Password credential.
    pub password_hash: PasswordHash,
    /// Current role.
    pub role: Role,
    /// Profile details.
    pub profile: UserProfile,
    /// Direct manager, if any.
    pub manager_id: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether `self` reports directly to `manager`.
    #[must_use]
    pub fn reports_to(&self, manager: &UserId) -> bool {
        self.manager_id.as_ref() == Some(manager)
    }

    /// First and last name joined by a space, or the email when both are
    /// missing.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = [
            self.profile.first_name.as_deref(),
            self.profile.last_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
        if name.is_empty() {
            self.email.to_string()
        } else {
            name
        }
    }
}

#[cfg(test)]
mod tests;
