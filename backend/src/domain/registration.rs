//! Registration Orchestrator.
//!
//! Self-service sign-up validates the invite, builds the employee record and
//! hands both to the enrollment port, which redeems the code and inserts the
//! user in one transaction. Trusted creation (HR and internal callers) skips
//! invites and sessions entirely.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{
    Enrollment, EnrollmentRepository, PasswordHasher, SessionIssuer, SessionToken, UserRepository,
    hash_blocking, map_enrollment_error, map_session_error, map_user_persistence_error,
};
use super::{
    AuthorizationGuard, Email, Error, InviteLedger, Password, PasswordHash, ProfileInput, Role,
    User, UserId,
};

/// Self-service sign-up payload.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Raw email address.
    pub email: String,
    /// Password, policy-checked by the service.
    pub password: Password,
    /// Optional profile fields.
    pub profile: ProfileInput,
    /// Invite code as typed by the user; blank means none.
    pub invite_code: Option<String>,
}

/// Account created by a trusted caller.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Raw email address.
    pub email: String,
    /// Password, policy-checked by the service.
    pub password: Password,
    /// Role to grant.
    pub role: Role,
    /// Optional profile fields.
    pub profile: ProfileInput,
    /// Manager to report to; must currently hold the manager role.
    pub manager_id: Option<UserId>,
}

/// Outcome of a successful self-service registration.
#[derive(Debug, Clone)]
pub struct Registered {
    /// Newly created user.
    pub user: User,
    /// Session for the new user.
    pub session: SessionToken,
}

/// Registration Orchestrator service.
#[derive(Clone)]
pub struct RegistrationService {
    users: Arc<dyn UserRepository>,
    enrollment: Arc<dyn EnrollmentRepository>,
    hasher: Arc<dyn PasswordHasher>,
    sessions: Arc<dyn SessionIssuer>,
    ledger: InviteLedger,
    guard: AuthorizationGuard,
    clock: Arc<dyn Clock>,
}

/// Ports consumed by [`RegistrationService`].
pub struct RegistrationPorts {
    /// Identity Store.
    pub users: Arc<dyn UserRepository>,
    /// Registration transaction.
    pub enrollment: Arc<dyn EnrollmentRepository>,
    /// Password hashing.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Token minting.
    pub sessions: Arc<dyn SessionIssuer>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl RegistrationService {
    /// Assemble the orchestrator around an existing ledger.
    pub fn new(ports: RegistrationPorts, ledger: InviteLedger) -> Self {
        Self {
            guard: AuthorizationGuard::new(ports.users.clone()),
            users: ports.users,
            enrollment: ports.enrollment,
            hasher: ports.hasher,
            sessions: ports.sessions,
            ledger,
            clock: ports.clock,
        }
    }

    /// Register an employee, optionally through an invite code.
    ///
    /// When the code's issuer currently holds the manager role the new user
    /// reports to them; codes issued by HR, or by a since-demoted manager,
    /// produce a user without a manager.
    pub async fn register(&self, request: RegistrationRequest) -> Result<Registered, Error> {
        let email = Email::parse(&request.email)?;
        request.password.check_policy()?;
        let profile = request.profile.validate()?;
        self.ensure_email_free(&email).await?;

        let invite_code = request
            .invite_code
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty());
        let (invite, manager_id) = match invite_code {
            Some(raw) => {
                let code = self.ledger.validate(raw).await?;
                let manager = self.inviting_manager(&code.issuer_id).await?;
                (Some(code.code), manager)
            }
            None => (None, None),
        };

        let password_hash = self.hash(&request.password).await?;
        let now = self.clock.utc();
        let user = User {
            id: UserId::random(),
            email,
            password_hash,
            role: Role::Employee,
            profile,
            manager_id,
            created_at: now,
            updated_at: now,
        };

        let consumed = self
            .enrollment
            .enroll(&Enrollment {
                user: user.clone(),
                invite,
                at: now,
            })
            .await
            .map_err(map_enrollment_error)?;
        let session = self.sessions.issue(&user.id).map_err(map_session_error)?;

        info!(
            user_id = %user.id,
            manager_id = ?user.manager_id,
            invited = consumed.is_some(),
            "user registered"
        );
        Ok(Registered { user, session })
    }

    /// HR-initiated account creation.
    ///
    /// HR only creates employees; promotion to manager or HR is an update.
    pub async fn create_employee(&self, caller: &UserId, account: NewAccount) -> Result<User, Error> {
        self.guard.require(caller, &[Role::Hr]).await?;
        if account.role != Role::Employee {
            return Err(Error::invalid_request(
                "HR can only create employees; change the role with an update",
            ));
        }
        self.provision(account).await
    }

    /// Create an account for a trusted caller; no invite, no session.
    pub async fn provision(&self, account: NewAccount) -> Result<User, Error> {
        let email = Email::parse(&account.email)?;
        account.password.check_policy()?;
        let profile = account.profile.validate()?;
        if let Some(manager_id) = account.manager_id.as_ref() {
            self.ensure_manager(manager_id).await?;
        }
        self.ensure_email_free(&email).await?;

        let password_hash = self.hash(&account.password).await?;
        let now = self.clock.utc();
        let user = User {
            id: UserId::random(),
            email,
            password_hash,
            role: account.role,
            profile,
            manager_id: account.manager_id,
            created_at: now,
            updated_at: now,
        };
        self.users
            .insert(&user)
            .await
            .map_err(map_user_persistence_error)?;

        info!(user_id = %user.id, role = %user.role, "user provisioned");
        Ok(user)
    }

    async fn ensure_email_free(&self, email: &Email) -> Result<(), Error> {
        let existing = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_persistence_error)?;
        match existing {
            Some(_) => Err(Error::conflict("Email already registered")),
            None => Ok(()),
        }
    }

    async fn ensure_manager(&self, manager_id: &UserId) -> Result<(), Error> {
        let manager = self
            .users
            .find_by_id(manager_id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::invalid_request("Assigned manager not found"))?;
        if manager.role != Role::Manager {
            return Err(Error::invalid_request("Assigned user is not a manager"));
        }
        Ok(())
    }

    async fn inviting_manager(&self, issuer: &UserId) -> Result<Option<UserId>, Error> {
        let issuer = self
            .users
            .find_by_id(issuer)
            .await
            .map_err(map_user_persistence_error)?;
        Ok(issuer
            .filter(|user| user.role == Role::Manager)
            .map(|user| user.id))
    }

    async fn hash(&self, password: &Password) -> Result<PasswordHash, Error> {
        hash_blocking(&self.hasher, password).await.map_err(|error| {
            tracing::error!(%error, "password hashing failed");
            Error::internal(error.to_string())
        })
    }
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod tests;
