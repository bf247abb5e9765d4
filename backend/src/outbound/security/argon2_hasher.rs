//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are stored in PHC string format, so parameters and salt travel with
//! the hash and verification needs no extra configuration.

use argon2::password_hash::{
    PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{Password, PasswordHash};

/// Argon2id hasher with a fresh random salt per hash.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Hasher using the crate's recommended default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hasher with explicit cost parameters; tests use cheap ones.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| PasswordHash::new(hash.to_string()))
            .map_err(|error| PasswordHashError::hashing(error.to_string()))
    }

    fn verify(&self, password: &Password, hash: &PasswordHash) -> bool {
        match PhcHash::new(hash.as_str()) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.expose().as_bytes(), &parsed)
                .is_ok(),
            Err(error) => {
                tracing::warn!(%error, "stored password hash is not a PHC string");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        let params = Params::new(8, 1, 1, None).expect("cheap argon2 params");
        Argon2PasswordHasher::with_params(params)
    }

    #[rstest]
    fn hash_verifies_only_the_original_password(hasher: Argon2PasswordHasher) {
        let hash = hasher
            .hash(&Password::unchecked("Passw0rd"))
            .expect("hashing succeeds");

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify(&Password::unchecked("Passw0rd"), &hash));
        assert!(!hasher.verify(&Password::unchecked("passw0rd"), &hash));
        assert!(!hasher.verify(&Password::unchecked("Passw0rd "), &hash));
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Argon2PasswordHasher) {
        let password = Password::unchecked("Passw0rd");

        let first = hasher.hash(&password).expect("first hash");
        let second = hasher.hash(&password).expect("second hash");

        assert_ne!(first, second);
    }

    #[rstest]
    #[case("")]
    #[case("plaintext")]
    #[case("$argon2id$broken")]
    fn malformed_hashes_never_verify(hasher: Argon2PasswordHasher, #[case] stored: &str) {
        let hash = PasswordHash::new(stored.to_owned());

        assert!(!hasher.verify(&Password::unchecked("Passw0rd"), &hash));
    }
}
