//! Port for password hashing primitives.
//!
//! Hashing is CPU bound, so services call it through [`hash_blocking`] and
//! [`verify_blocking`], which move the work onto Tokio's blocking pool.

use std::sync::Arc;

use crate::domain::{Password, PasswordHash, TraceId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hasher adapters.
    pub enum PasswordHashError {
        /// Hashing failed inside the adapter.
        Hashing { message: String } => "password hashing failed: {message}",
        /// The blocking task panicked or was cancelled.
        Worker { message: String } => "password worker failed: {message}",
    }
}

/// Hash and verify plaintext passwords.
///
/// Implementations are synchronous and CPU bound.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash of `password`.
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError>;

    /// Whether `password` matches `hash`. Malformed hashes never match.
    fn verify(&self, password: &Password, hash: &PasswordHash) -> bool;
}

/// Run [`PasswordHasher::hash`] off the async executor.
pub async fn hash_blocking(
    hasher: &Arc<dyn PasswordHasher>,
    password: &Password,
) -> Result<PasswordHash, PasswordHashError> {
    let hasher = Arc::clone(hasher);
    let password = password.clone();
    TraceId::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|error| PasswordHashError::worker(error.to_string()))?
}

/// Run [`PasswordHasher::verify`] off the async executor.
///
/// A worker that fails to finish counts as a mismatch.
pub async fn verify_blocking(
    hasher: &Arc<dyn PasswordHasher>,
    password: &Password,
    hash: &PasswordHash,
) -> bool {
    let hasher = Arc::clone(hasher);
    let password = password.clone();
    let hash = hash.clone();
    TraceId::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .unwrap_or_else(|error| {
            tracing::error!(%error, "password verification worker failed");
            false
        })
}
