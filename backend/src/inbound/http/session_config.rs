//! Bearer-token signing configuration and validation.
//!
//! Turns the configured JWT secret and token lifetime into
//! [`SessionSettings`], applying stricter rules to release builds so a
//! production process never signs tokens with a missing or weak secret.

use chrono::Duration;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::warn;
use zeroize::Zeroizing;

pub mod fingerprint;

/// Shortest secret accepted in release builds.
pub const SECRET_MIN_LEN: usize = 32;
/// Longest token lifetime accepted.
pub const MAX_TOKEN_TTL_HOURS: u32 = 24 * 30;
const EPHEMERAL_SECRET_LEN: usize = 64;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate missing or short secrets and emit warnings.
    Debug,
    /// Release builds require an explicit, sufficiently long secret.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use staff_directory::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated token signing settings.
pub struct SessionSettings {
    /// HS256 signing secret; zeroed on drop.
    pub secret: Zeroizing<Vec<u8>>,
    /// Lifetime of issued tokens.
    pub ttl: Duration,
    /// Whether the secret was generated for this process only.
    pub ephemeral: bool,
}

impl SessionSettings {
    /// Short, non-reversible identifier of the active secret for logs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint::secret_fingerprint(&self.secret)
    }
}

impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("fingerprint", &self.fingerprint())
            .field("ttl", &self.ttl)
            .field("ephemeral", &self.ephemeral)
            .finish()
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionConfigError {
    /// No secret was configured in a release build.
    #[error("DIRECTORY_JWT_SECRET must be set in release builds")]
    MissingSecret,
    /// The configured secret is too short for a release build.
    #[error("JWT secret too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
    /// The token lifetime is outside `1..=MAX_TOKEN_TTL_HOURS`.
    #[error("token_ttl_hours must be between 1 and {max}, got {value}")]
    InvalidTtl { value: u32, max: u32 },
}

/// Validate the configured secret and lifetime.
///
/// Debug builds fall back to a random per-process secret when none is
/// configured, which invalidates every token on restart.
///
/// # Examples
///
/// ```rust
/// use staff_directory::inbound::http::session_config::{BuildMode, session_settings};
///
/// let settings = session_settings(
///     Some("0123456789abcdef0123456789abcdef"),
///     24,
///     BuildMode::Release,
/// )
/// .expect("valid settings");
/// assert_eq!(settings.ttl, chrono::Duration::hours(24));
/// assert!(!settings.ephemeral);
/// ```
pub fn session_settings(
    secret: Option<&str>,
    ttl_hours: u32,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    if ttl_hours == 0 || ttl_hours > MAX_TOKEN_TTL_HOURS {
        return Err(SessionConfigError::InvalidTtl {
            value: ttl_hours,
            max: MAX_TOKEN_TTL_HOURS,
        });
    }
    let ttl = Duration::hours(i64::from(ttl_hours));

    match secret.filter(|value| !value.is_empty()) {
        Some(value) => {
            let length = value.len();
            if length < SECRET_MIN_LEN {
                if !mode.is_debug() {
                    return Err(SessionConfigError::SecretTooShort {
                        length,
                        min_len: SECRET_MIN_LEN,
                    });
                }
                warn!(length, min_len = SECRET_MIN_LEN, "JWT secret is short (dev only)");
            }
            Ok(SessionSettings {
                secret: Zeroizing::new(value.as_bytes().to_vec()),
                ttl,
                ephemeral: false,
            })
        }
        None if mode.is_debug() => {
            warn!("DIRECTORY_JWT_SECRET not set; using a temporary secret (dev only)");
            let mut bytes = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
            OsRng.fill_bytes(bytes.as_mut_slice());
            Ok(SessionSettings {
                secret: bytes,
                ttl,
                ephemeral: true,
            })
        }
        None => Err(SessionConfigError::MissingSecret),
    }
}

#[cfg(test)]
mod tests;
