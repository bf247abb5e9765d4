//! HS256 JWT implementation of the `SessionIssuer` port.
//!
//! Expiry is checked against the injected clock rather than the system time
//! so token lifetimes are testable.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{SessionError, SessionIssuer, SessionToken};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct JwtSessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtSessionIssuer {
    /// Build an issuer from the signing secret and token lifetime.
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            clock,
        }
    }
}

impl SessionIssuer for JwtSessionIssuer {
    fn issue(&self, user: &UserId) -> Result<SessionToken, SessionError> {
        let now = self.clock.utc();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: *user.as_uuid(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|error| SessionError::signing(error.to_string()))?;
        Ok(SessionToken {
            access_token,
            expires_at,
        })
    }

    fn resolve(&self, token: &str) -> Result<UserId, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|error| SessionError::invalid(error.to_string()))?;
        if data.claims.exp <= self.clock.utc().timestamp() {
            return Err(SessionError::expired());
        }
        Ok(UserId::from_uuid(data.claims.sub))
    }
}
