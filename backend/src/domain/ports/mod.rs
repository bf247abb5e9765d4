//! Domain ports for the hexagonal boundary.
//!
//! Driven ports only: the store, the password hasher and the session issuer.
//! Inbound adapters talk to the domain services directly.

mod macros;
pub(crate) use macros::define_port_error;

mod enrollment_repository;
mod invite_code_repository;
mod password_hasher;
mod session_issuer;
mod user_repository;

#[cfg(test)]
pub use enrollment_repository::MockEnrollmentRepository;
pub use enrollment_repository::{
    Enrollment, EnrollmentError, EnrollmentRepository, map_enrollment_error,
};
#[cfg(test)]
pub use invite_code_repository::MockInviteCodeRepository;
pub use invite_code_repository::{
    InviteCodePersistenceError, InviteCodeRepository, map_invite_persistence_error,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{
    PasswordHashError, PasswordHasher, hash_blocking, verify_blocking,
};
#[cfg(test)]
pub use session_issuer::MockSessionIssuer;
pub use session_issuer::{SessionError, SessionIssuer, SessionToken, map_session_error};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository, map_user_persistence_error};
