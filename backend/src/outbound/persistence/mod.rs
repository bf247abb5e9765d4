//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the directory's storage ports backed by
//! PostgreSQL through `diesel-async` and `bb8` pooling.
//!
//! - Repository implementations translate between row structs and domain
//!   types and hold no business rules.
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) never
//!   leave this module.
//! - Database errors are reduced to the port error types; driver messages are
//!   logged at debug level and not propagated.
//!
//! # Example
//!
//! ```ignore
//! use staff_directory::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/directory")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_enrollment_repository;
mod diesel_helpers;
mod diesel_invite_code_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_enrollment_repository::DieselEnrollmentRepository;
pub use diesel_invite_code_repository::DieselInviteCodeRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
