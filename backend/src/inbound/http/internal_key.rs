//! `X-Internal-Key` extractor guarding the `/internal/v1` routes.
//!
//! The configured key is stored as a SHA-256 digest and the presented key is
//! hashed before comparison, so the comparison never short-circuits on the
//! first differing byte of the secret itself.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use sha2::{Digest, Sha256};

use crate::domain::Error;

/// Header carrying the service-to-service key.
pub const INTERNAL_KEY_HEADER: &str = "X-Internal-Key";

const REJECTED: &str = "Invalid or missing internal API key";

/// Configured internal API key. `None` disables the internal routes.
#[derive(Clone)]
pub struct InternalApiKey {
    digest: Option<[u8; 32]>,
}

impl std::fmt::Debug for InternalApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalApiKey")
            .field("configured", &self.digest.is_some())
            .finish()
    }
}

fn digest(value: &[u8]) -> [u8; 32] {
    Sha256::digest(value).into()
}

impl InternalApiKey {
    /// Build from the configured key; blank values disable the routes.
    #[must_use]
    pub fn new(key: Option<&str>) -> Self {
        let digest = key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| digest(key.as_bytes()));
        Self { digest }
    }

    /// Whether any key is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    fn accepts(&self, presented: &[u8]) -> bool {
        let Some(expected) = self.digest.as_ref() else {
            return false;
        };
        let actual = digest(presented);
        expected
            .iter()
            .zip(actual.iter())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

/// Proof that the request presented the internal API key.
#[derive(Debug, Clone, Copy)]
pub struct InternalCaller;

fn check(req: &HttpRequest) -> Result<InternalCaller, Error> {
    let Some(key) = req.app_data::<web::Data<InternalApiKey>>() else {
        tracing::error!("internal API key missing from app data");
        return Err(Error::unauthorized(REJECTED));
    };
    if !key.is_enabled() {
        tracing::warn!("internal API called but no key is configured");
        return Err(Error::unauthorized(REJECTED));
    }
    let presented = req
        .headers()
        .get(INTERNAL_KEY_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();
    if presented.is_empty() || !key.accepts(presented) {
        return Err(Error::unauthorized(REJECTED));
    }
    Ok(InternalCaller)
}

impl FromRequest for InternalCaller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(check(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;

    async fn guarded(_: InternalCaller) -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    async fn call(configured: Option<&str>, presented: Option<&str>) -> StatusCode {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(InternalApiKey::new(configured)))
                .route("/", web::get().to(guarded)),
        )
        .await;
        let mut request = actix_test::TestRequest::get().uri("/");
        if let Some(value) = presented {
            request = request.insert_header((INTERNAL_KEY_HEADER, value));
        }
        actix_test::call_service(&app, request.to_request()).await.status()
    }

    #[rstest]
    #[case(Some("s3cret-key"), Some("s3cret-key"), StatusCode::OK)]
    #[case(Some("s3cret-key"), Some("s3cret-kez"), StatusCode::UNAUTHORIZED)]
    #[case(Some("s3cret-key"), None, StatusCode::UNAUTHORIZED)]
    #[case(None, Some("anything"), StatusCode::UNAUTHORIZED)]
    #[case(Some("   "), Some("   "), StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn only_the_configured_key_is_accepted(
        #[case] configured: Option<&str>,
        #[case] presented: Option<&str>,
        #[case] expected: StatusCode,
    ) {
        assert_eq!(call(configured, presented).await, expected);
    }

    #[rstest]
    fn debug_output_hides_the_key() {
        let rendered = format!("{:?}", InternalApiKey::new(Some("s3cret-key")));

        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("configured: true"));
    }
}
