//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint, the response views and the two
//! security schemes: bearer tokens for `/api/v1` and the `X-Internal-Key`
//! header for `/internal/v1`. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::accounts::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::internal::{CreateManagedInviteRequest, UseInviteRequest};
use crate::inbound::http::internal_key::INTERNAL_KEY_HEADER;
use crate::inbound::http::invites::CreateInviteRequest;
use crate::inbound::http::schemas::{ErrorCodeSchema, RoleSchema};
use crate::inbound::http::user_dto::{CreateUserRequest, UpdateUserRequest};
use crate::inbound::http::views::{InviteCheckView, InviteView, SessionView, UserView};

/// Adds the bearer and internal-key security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token issued by POST /api/v1/auth/login or /api/v1/auth/register.",
                    ))
                    .build(),
            ),
        );
        components.add_security_scheme(
            "InternalKey",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                INTERNAL_KEY_HEADER,
                "Shared service-to-service key for /internal/v1.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Staff directory API",
        description = "Employee directory with role-gated access and invite-code onboarding."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::current_user,
        crate::inbound::http::accounts::update_current_user,
        crate::inbound::http::invites::create_invite,
        crate::inbound::http::invites::list_invites,
        crate::inbound::http::invites::revoke_invite,
        crate::inbound::http::invites::check_invite,
        crate::inbound::http::employees::create_employee,
        crate::inbound::http::employees::list_employees,
        crate::inbound::http::employees::get_employee,
        crate::inbound::http::employees::update_employee,
        crate::inbound::http::employees::delete_employee,
        crate::inbound::http::employees::list_managers,
        crate::inbound::http::employees::list_team,
        crate::inbound::http::internal::create_user,
        crate::inbound::http::internal::list_users,
        crate::inbound::http::internal::get_user,
        crate::inbound::http::internal::update_user,
        crate::inbound::http::internal::delete_user,
        crate::inbound::http::internal::create_invite,
        crate::inbound::http::internal::get_invite,
        crate::inbound::http::internal::use_invite,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorBody,
        ErrorCodeSchema,
        RoleSchema,
        UserView,
        InviteView,
        InviteCheckView,
        SessionView,
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        CreateInviteRequest,
        CreateUserRequest,
        UpdateUserRequest,
        CreateManagedInviteRequest,
        UseInviteRequest,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "The caller's own profile"),
        (name = "invites", description = "Invite codes for onboarding"),
        (name = "hr", description = "Directory management for HR and managers"),
        (name = "internal", description = "Trusted service-to-service API"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
