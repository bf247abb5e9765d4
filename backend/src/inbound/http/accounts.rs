//! Account handlers: registration, login and the caller's own profile.
//!
//! ```text
//! POST /api/v1/auth/register {"email":"a@x.com","password":"Passw0rd","invite_code":"ABCD123456"}
//! POST /api/v1/auth/login {"email":"a@x.com","password":"Passw0rd"}
//! GET /api/v1/users/me
//! PUT /api/v1/users/me {"first_name":"Ada","current_password":"...","new_password":"..."}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    Error, LoginCredentials, Password, PasswordChange, ProfileInput, ProfileUpdate,
    RegistrationRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::session::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{SessionView, UserView};

/// Self-registration body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "dateOfBirth")]
    pub date_of_birth: Option<NaiveDate>,
    /// Optional invite code; links the new user to the inviting manager.
    #[serde(default, alias = "inviteCode", alias = "code")]
    pub invite_code: Option<String>,
}

impl From<RegisterRequest> for RegistrationRequest {
    fn from(value: RegisterRequest) -> Self {
        Self {
            email: value.email,
            password: Password::unchecked(value.password),
            profile: ProfileInput {
                first_name: value.first_name,
                last_name: value.last_name,
                department: value.department,
                address: value.address,
                date_of_birth: value.date_of_birth,
            },
            invite_code: value.invite_code,
        }
    }
}

/// Login body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Self-service profile changes. A blank string clears a field.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "dateOfBirth")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, alias = "currentPassword")]
    pub current_password: Option<String>,
    #[serde(default, alias = "newPassword")]
    pub new_password: Option<String>,
}

impl TryFrom<UpdateProfileRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: UpdateProfileRequest) -> Result<Self, Self::Error> {
        let password = match (value.current_password, value.new_password) {
            (_, None) => None,
            (Some(current), Some(new)) if !current.is_empty() => Some(PasswordChange {
                current: Password::unchecked(current),
                new: Password::unchecked(new),
            }),
            (_, Some(_)) => {
                return Err(
                    Error::invalid_request("Current password is required to set a new password")
                        .with_details(json!({ "field": "current_password", "code": "missing_field" })),
                );
            }
        };
        Ok(Self {
            first_name: value.first_name,
            last_name: value.last_name,
            address: value.address,
            date_of_birth: value.date_of_birth,
            password,
        })
    }
}

/// Register a new employee account, optionally redeeming an invite code.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered; returns a bearer token", body = SessionView),
        (status = 400, description = "Invalid request or invite code", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registered = state
        .registration
        .register(payload.into_inner().into())
        .await?;
    Ok(Envelope::created(
        "User registered successfully",
        SessionView::new(&registered.user, registered.session),
    ))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionView),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)?;
    let signed_in = state.accounts.login(credentials).await?;
    Ok(Envelope::ok(
        "Login successful",
        SessionView::new(&signed_in.user, signed_in.session),
    ))
}

/// The caller's own record, including personal fields.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = UserView),
        (status = 401, description = "Unauthorised", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let user = state.accounts.profile(caller.id()).await?;
    Ok(Envelope::ok("Profile retrieved", UserView::full(&user)))
}

/// Update names, address, date of birth or password.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserView),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[put("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<HttpResponse> {
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let user = state.accounts.update_profile(caller.id(), update).await?;
    Ok(Envelope::ok("Profile updated", UserView::full(&user)))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
