//! Bearer token extractor for `/api/v1` routes.
//!
//! Handlers take an [`AuthenticatedUser`] argument; the extractor resolves the
//! `Authorization: Bearer` token through the session issuer so handlers only
//! see a domain [`UserId`]. Role checks happen in the services.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::ports::map_session_error;
use crate::domain::{Error, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity carried by a valid bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// The token's user.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let Some(token) = bearer_token(req) else {
        return Err(Error::unauthorized("Authorization token required"));
    };
    let state = req.app_data::<web::Data<HttpState>>().ok_or_else(|| {
        tracing::error!("HTTP state missing from app data");
        Error::internal("HTTP state not configured")
    })?;
    state
        .sessions
        .resolve(token)
        .map(AuthenticatedUser)
        .map_err(|error| {
            tracing::debug!(%error, "bearer token rejected");
            map_session_error(error)
        })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
