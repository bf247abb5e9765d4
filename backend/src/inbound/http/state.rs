//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle through `actix_web::web::Data`. Services are
//! assembled once from a [`HttpStatePorts`] parameter object, so swapping the
//! PostgreSQL adapters for the in-memory store touches only the ports.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    EnrollmentRepository, InviteCodeRepository, PasswordHasher, SessionIssuer, UserRepository,
};
use crate::domain::{
    AccountService, DirectoryService, InviteCodeGenerator, InviteLedger, RegistrationPorts,
    RegistrationService,
};

/// Parameter object bundling every port implementation the handlers need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub invite_codes: Arc<dyn InviteCodeRepository>,
    pub enrollment: Arc<dyn EnrollmentRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub sessions: Arc<dyn SessionIssuer>,
    pub code_generator: Arc<dyn InviteCodeGenerator>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub directory: DirectoryService,
    pub registration: RegistrationService,
    pub invites: InviteLedger,
    pub sessions: Arc<dyn SessionIssuer>,
}

impl HttpState {
    /// Assemble the services from their ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use staff_directory::domain::RandomInviteCodeGenerator;
    /// use staff_directory::inbound::http::state::{HttpState, HttpStatePorts};
    /// use staff_directory::outbound::memory::InMemoryDirectory;
    /// use staff_directory::outbound::security::{Argon2PasswordHasher, JwtSessionIssuer};
    ///
    /// let store = Arc::new(InMemoryDirectory::default());
    /// let clock = Arc::new(DefaultClock);
    /// let state = HttpState::new(HttpStatePorts {
    ///     users: store.clone(),
    ///     invite_codes: store.clone(),
    ///     enrollment: store,
    ///     hasher: Arc::new(Argon2PasswordHasher::default()),
    ///     sessions: Arc::new(JwtSessionIssuer::new(
    ///         b"doc-example-secret-doc-example-secret",
    ///         chrono::Duration::hours(1),
    ///         clock.clone(),
    ///     )),
    ///     code_generator: Arc::new(RandomInviteCodeGenerator),
    ///     clock,
    /// });
    /// let _ = state.sessions.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            invite_codes,
            enrollment,
            hasher,
            sessions,
            code_generator,
            clock,
        } = ports;

        let invites = InviteLedger::new(invite_codes, users.clone(), code_generator, clock.clone());
        let registration = RegistrationService::new(
            RegistrationPorts {
                users: users.clone(),
                enrollment,
                hasher: hasher.clone(),
                sessions: sessions.clone(),
                clock: clock.clone(),
            },
            invites.clone(),
        );
        let accounts = AccountService::new(
            users.clone(),
            hasher.clone(),
            sessions.clone(),
            clock.clone(),
        );
        let directory = DirectoryService::new(users, hasher, clock);

        Self {
            accounts,
            directory,
            registration,
            invites,
            sessions,
        }
    }
}
