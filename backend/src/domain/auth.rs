//! Authentication primitives: passwords and login credentials.
//!
//! Inbound adapters hand raw strings to these constructors before a service
//! touches a port, so weak or blank secrets never reach the hasher.

use std::fmt;

use serde_json::json;
use zeroize::Zeroizing;

use super::Error;

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN_LEN: usize = 8;

/// Password strength failures, reported one at a time in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PasswordPolicyError {
    /// The password was blank.
    #[error("Password is required")]
    Empty,
    /// Fewer than [`PASSWORD_MIN_LEN`] characters.
    #[error("Password must be at least {min} characters long")]
    TooShort {
        /// Required minimum.
        min: usize,
    },
    /// No ASCII letter present.
    #[error("Password must contain at least one letter")]
    MissingLetter,
    /// No ASCII digit present.
    #[error("Password must contain at least one number")]
    MissingDigit,
}

impl PasswordPolicyError {
    const fn code(self) -> &'static str {
        match self {
            Self::Empty => "missing_field",
            Self::TooShort { .. } => "too_short",
            Self::MissingLetter => "missing_letter",
            Self::MissingDigit => "missing_digit",
        }
    }
}

impl From<PasswordPolicyError> for Error {
    fn from(value: PasswordPolicyError) -> Self {
        Self::invalid_request(value.to_string()).with_details(json!({
            "field": "password",
            "code": value.code(),
        }))
    }
}

/// Plaintext password held only as long as needed and zeroed on drop.
///
/// Whitespace is preserved; the caller's exact input is what gets hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a password without applying the strength policy.
    ///
    /// Used for verification, where the stored hash is the authority.
    #[must_use]
    pub fn unchecked(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// Wrap a password after enforcing the strength policy.
    ///
    /// # Examples
    /// ```
    /// use staff_directory::domain::{Password, PasswordPolicyError};
    ///
    /// assert!(Password::new("Passw0rd").is_ok());
    /// assert_eq!(
    ///     Password::new("short1").err(),
    ///     Some(PasswordPolicyError::TooShort { min: 8 })
    /// );
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, PasswordPolicyError> {
        let password = Self::unchecked(raw);
        password.check_policy()?;
        Ok(password)
    }

    /// Enforce the strength policy on a password built with
    /// [`Password::unchecked`].
    pub fn check_policy(&self) -> Result<(), PasswordPolicyError> {
        let value = self.expose();
        if value.is_empty() {
            return Err(PasswordPolicyError::Empty);
        }
        if value.chars().count() < PASSWORD_MIN_LEN {
            return Err(PasswordPolicyError::TooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        if !value.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(PasswordPolicyError::MissingLetter);
        }
        if !value.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }
        Ok(())
    }

    /// Plaintext for hashing or verification.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

impl From<LoginValidationError> for Error {
    fn from(value: LoginValidationError) -> Self {
        let field = match value {
            LoginValidationError::EmptyEmail => "email",
            LoginValidationError::EmptyPassword => "password",
        };
        Self::invalid_request(value.to_string()).with_details(json!({
            "field": field,
            "code": "missing_field",
        }))
    }
}

/// Login credentials used by the account service.
///
/// ## Invariants
/// - `email` is trimmed and non-empty; its format is not checked here so
///   malformed addresses fail with the same message as unknown ones.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use staff_directory::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" a@x.com ", "Passw0rd").unwrap();
/// assert_eq!(creds.email(), "a@x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized.to_owned(),
            password: Password::unchecked(password),
        })
    }

    /// Email string suitable for user lookups.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    #[must_use]
    pub const fn password(&self) -> &Password {
        &self.password
    }
}
