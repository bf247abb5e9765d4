//! Success envelope shared by every JSON endpoint.
//!
//! ```text
//! {"status": "success", "message": "Login successful", "data": {...}}
//! ```

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

const SUCCESS_STATUS: &str = "success";

/// Wire form of a successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Always `"success"`.
    pub status: String,
    /// Human-readable outcome.
    pub message: String,
    /// Payload, omitted for message-only responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    fn respond(status: StatusCode, message: &str, data: Option<T>) -> HttpResponse {
        HttpResponse::build(status).json(Self {
            status: SUCCESS_STATUS.to_owned(),
            message: message.to_owned(),
            data,
        })
    }

    /// `200 OK` with a payload.
    pub fn ok(message: &str, data: T) -> HttpResponse {
        Self::respond(StatusCode::OK, message, Some(data))
    }

    /// `201 Created` with a payload.
    pub fn created(message: &str, data: T) -> HttpResponse {
        Self::respond(StatusCode::CREATED, message, Some(data))
    }
}

/// `200 OK` without a payload.
pub fn message_only(message: &str) -> HttpResponse {
    Envelope::<()>::respond(StatusCode::OK, message, None)
}
