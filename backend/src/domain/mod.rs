//! Domain primitives, aggregates and services.
//!
//! Purpose: hold the directory's business rules independent of HTTP and
//! storage. Entities validate their own fields; services enforce rules that
//! span records (role gates, manager links, invite accounting).
//!
//! Public surface:
//! - Error / ErrorCode: error payload shared by every adapter.
//! - User, Role, InviteCode: the persisted aggregates.
//! - AuthorizationGuard, InviteLedger, RegistrationService, AccountService,
//!   DirectoryService: the services inbound adapters call.

pub mod account_service;
pub mod auth;
pub mod authorization;
pub mod directory_service;
pub mod error;
pub mod invite;
pub mod invite_ledger;
pub mod ports;
pub mod registration;
pub mod role;
pub mod trace_id;
pub mod user;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::account_service::{AccountService, PasswordChange, ProfileUpdate, SignedIn};
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN_LEN, Password, PasswordPolicyError,
};
pub use self::authorization::{AuthorizationGuard, can_view, sees_personal_details};
pub use self::directory_service::{DirectoryService, ManagerChange, UserChanges, Viewed};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::invite::{
    DEFAULT_EXPIRY_DAYS, INVITE_CODE_ALPHABET, INVITE_CODE_LENGTH, InviteCode,
    InviteCodeGenerator, InviteCodeValue, InviteRequest, InviteTerms, InviteValidationError,
    RandomInviteCodeGenerator,
};
pub use self::invite_ledger::InviteLedger;
pub use self::registration::{
    NewAccount, Registered, RegistrationPorts, RegistrationRequest, RegistrationService,
};
pub use self::role::{Role, RoleParseError, describe_roles};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, PasswordHash, ProfileInput, User, UserId, UserProfile, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use staff_directory::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
