//! HTTP inbound adapter exposing REST endpoints.
//!
//! Bearer-token routes live under `/api/v1` and key-protected
//! service-to-service routes under `/internal/v1`. The two scopes use
//! separate extractors ([`session::AuthenticatedUser`] and
//! [`internal_key::InternalCaller`]).

pub mod accounts;
pub mod employees;
pub mod envelope;
pub mod error;
pub mod health;
pub mod internal;
pub mod internal_key;
pub mod invites;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod user_dto;
pub mod validation;
pub mod views;

use actix_web::web;

pub use error::ApiResult;

/// Register the JSON error handler and both route scopes.
///
/// The caller supplies `web::Data<HttpState>` and `web::Data<InternalApiKey>`
/// as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .service(
            web::scope("/api/v1")
                .service(accounts::register)
                .service(accounts::login)
                .service(accounts::current_user)
                .service(accounts::update_current_user)
                .service(invites::create_invite)
                .service(invites::list_invites)
                .service(invites::check_invite)
                .service(invites::revoke_invite)
                .service(employees::create_employee)
                .service(employees::list_employees)
                .service(employees::list_managers)
                .service(employees::list_team)
                .service(employees::get_employee)
                .service(employees::update_employee)
                .service(employees::delete_employee),
        )
        .service(
            web::scope("/internal/v1")
                .service(internal::create_user)
                .service(internal::list_users)
                .service(internal::get_user)
                .service(internal::update_user)
                .service(internal::delete_user)
                .service(internal::create_invite)
                .service(internal::get_invite)
                .service(internal::use_invite),
        );
}
