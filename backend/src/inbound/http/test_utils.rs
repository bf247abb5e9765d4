//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use argon2::Params;
use chrono::Duration;
use rstest::fixture;

use crate::domain::ports::{
    InviteCodeRepository, PasswordHasher as _, SessionIssuer as _, UserRepository,
};
use crate::domain::test_fixtures::{fixture_clock, fixture_timestamp, user_with_role};
use crate::domain::{
    InviteCode, InviteCodeValue, InviteRequest, Password, RandomInviteCodeGenerator, Role, User,
    UserId,
};
use crate::inbound::http::internal_key::InternalApiKey;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::InMemoryDirectory;
use crate::outbound::security::{Argon2PasswordHasher, JwtSessionIssuer};

/// Password given to every seeded user.
pub const SEEDED_PASSWORD: &str = "Passw0rd";

/// Internal API key configured on [`TestContext::app`].
pub const TEST_INTERNAL_KEY: &str = "test-internal-key";

const TEST_SECRET: &[u8] = b"handler-test-secret-handler-test-secret";

/// In-memory wiring shared by handler tests.
#[derive(Clone)]
pub struct TestContext {
    pub store: Arc<InMemoryDirectory>,
    hasher: Arc<Argon2PasswordHasher>,
    sessions: Arc<JwtSessionIssuer>,
    state: web::Data<HttpState>,
}

impl TestContext {
    /// State to register with `App::app_data`.
    pub fn state(&self) -> web::Data<HttpState> {
        self.state.clone()
    }

    /// Sign a bearer token for `user`.
    pub fn token_for(&self, user: &UserId) -> String {
        self.sessions
            .issue(user)
            .expect("test token issues")
            .access_token
    }

    /// `Authorization` header value for `user`.
    pub fn bearer(&self, user: &User) -> (actix_web::http::header::HeaderName, String) {
        (
            actix_web::http::header::AUTHORIZATION,
            format!("Bearer {}", self.token_for(&user.id)),
        )
    }

    /// The full application: both scopes, JSON error handler and trace ids.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state())
            .app_data(web::Data::new(InternalApiKey::new(Some(TEST_INTERNAL_KEY))))
            .wrap(crate::middleware::Trace)
            .configure(crate::inbound::http::configure)
    }

    /// Insert a user holding `role` whose password is [`SEEDED_PASSWORD`].
    pub async fn seed(&self, role: Role) -> User {
        self.seed_user(user_with_role(role)).await
    }

    /// Insert a prepared user after replacing its hash with one of
    /// [`SEEDED_PASSWORD`].
    pub async fn seed_user(&self, mut user: User) -> User {
        user.password_hash = self
            .hasher
            .hash(&Password::unchecked(SEEDED_PASSWORD))
            .expect("seed hash");
        UserRepository::insert(self.store.as_ref(), &user)
            .await
            .expect("seed insert");
        user
    }

    /// Insert an invite with a chosen code, issued at the fixture time.
    pub async fn seed_invite(&self, issuer: &User, code: &str, request: InviteRequest) -> InviteCode {
        let now = fixture_timestamp();
        let invite = InviteCode::issue(
            InviteCodeValue::parse(code).expect("fixture code"),
            issuer.id,
            request.terms(now).expect("fixture terms"),
            now,
        );
        InviteCodeRepository::insert(self.store.as_ref(), &invite)
            .await
            .expect("seed invite");
        invite
    }
}

/// Fresh in-memory context with cheap argon2 parameters and a fixed clock.
#[fixture]
pub fn test_context() -> TestContext {
    let store = Arc::new(InMemoryDirectory::default());
    let clock = fixture_clock();
    let hasher = Arc::new(Argon2PasswordHasher::with_params(
        Params::new(8, 1, 1, None).expect("cheap argon2 params"),
    ));
    let sessions = Arc::new(JwtSessionIssuer::new(
        TEST_SECRET,
        Duration::hours(24),
        clock.clone(),
    ));
    let state = HttpState::new(HttpStatePorts {
        users: store.clone(),
        invite_codes: store.clone(),
        enrollment: store.clone(),
        hasher: hasher.clone(),
        sessions: sessions.clone(),
        code_generator: Arc::new(RandomInviteCodeGenerator),
        clock,
    });

    TestContext {
        store,
        hasher,
        sessions,
        state: web::Data::new(state),
    }
}
