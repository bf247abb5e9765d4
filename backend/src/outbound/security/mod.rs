//! Credential adapters: argon2 password hashing and JWT bearer sessions.

mod argon2_hasher;
mod jwt_sessions;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt_sessions::JwtSessionIssuer;
