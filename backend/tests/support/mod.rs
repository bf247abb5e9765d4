//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so the
//! in-memory wiring lives here instead of being repeated per file.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use argon2::Params;
use mockable::{Clock, DefaultClock};
use staff_directory::Trace;
use staff_directory::domain::{
    NewAccount, Password, ProfileInput, RandomInviteCodeGenerator, Role, User,
};
use staff_directory::inbound::http::internal_key::InternalApiKey;
use staff_directory::inbound::http::state::{HttpState, HttpStatePorts};
use staff_directory::outbound::memory::InMemoryDirectory;
use staff_directory::outbound::security::{Argon2PasswordHasher, JwtSessionIssuer};

/// Internal key configured on [`app`].
#[allow(dead_code, reason = "not every test crate calls the HTTP app")]
pub const INTERNAL_KEY: &str = "integration-internal-key";

const SECRET: &[u8] = b"integration-secret-integration-secret";

/// Services over a fresh in-memory store with cheap argon2 parameters.
pub fn directory_state() -> HttpState {
    let store = Arc::new(InMemoryDirectory::default());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher = Argon2PasswordHasher::with_params(
        Params::new(8, 1, 1, None).expect("cheap argon2 params"),
    );
    HttpState::new(HttpStatePorts {
        users: store.clone(),
        invite_codes: store.clone(),
        enrollment: store,
        hasher: Arc::new(hasher),
        sessions: Arc::new(JwtSessionIssuer::new(
            SECRET,
            chrono::Duration::hours(1),
            clock.clone(),
        )),
        code_generator: Arc::new(RandomInviteCodeGenerator),
        clock,
    })
}

/// The full application over `state`, as the server assembles it.
#[allow(dead_code, reason = "not every test crate calls the HTTP app")]
pub fn app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::Data::new(InternalApiKey::new(Some(INTERNAL_KEY))))
        .wrap(Trace)
        .configure(staff_directory::inbound::http::configure)
}

/// Create an account directly through the trusted provisioning path.
pub async fn provision(state: &HttpState, email: &str, role: Role) -> User {
    state
        .registration
        .provision(NewAccount {
            email: email.to_owned(),
            password: Password::unchecked("Passw0rd"),
            role,
            profile: ProfileInput::default(),
            manager_id: None,
        })
        .await
        .expect("provisioned account")
}
