//! Service-to-service endpoints under `/internal/v1`.
//!
//! Every handler takes an [`InternalCaller`], so only requests presenting the
//! configured `X-Internal-Key` reach the services. Callers are trusted
//! completely: there is no role filtering and every field is returned.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{InviteCode, InviteRequest, NewAccount};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{Envelope, message_only};
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::internal_key::InternalCaller;
use crate::inbound::http::invites::CreateInviteRequest;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::user_dto::{CreateUserRequest, UpdateUserRequest};
use crate::inbound::http::validation::{FieldName, parse_role, parse_user_id};
use crate::inbound::http::views::{InviteView, UserView};

const USER_ID: FieldName = FieldName::new("id");

/// Optional role filter for the user listing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ListUsersQuery {
    /// `hr`, `manager` or `employee`.
    pub role: Option<String>,
}

/// Invite minted for a named manager.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateManagedInviteRequest {
    #[serde(alias = "managerId")]
    pub manager_id: String,
    /// Code value to use instead of a generated one.
    #[serde(default)]
    #[schema(example = "ABCD123456")]
    pub code: Option<String>,
    /// Exact expiry; excludes `expires_in_days`.
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub options: CreateInviteRequest,
}

/// Redemption on behalf of an existing user.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UseInviteRequest {
    #[serde(alias = "usedById")]
    pub used_by_id: String,
}

#[utoipa::path(
    post,
    path = "/internal/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Missing or wrong internal key", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    ),
    tags = ["internal"],
    operation_id = "internalCreateUser",
    security(("InternalKey" = []))
)]
#[post("/users")]
pub async fn create_user(
    _caller: InternalCaller,
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let account = NewAccount::try_from(payload.into_inner())?;
    let user = state.registration.provision(account).await?;
    Ok(Envelope::created("User created", UserView::full(&user)))
}

#[utoipa::path(
    get,
    path = "/internal/v1/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = [UserView]),
        (status = 400, description = "Unknown role", body = ErrorBody),
        (status = 401, description = "Missing or wrong internal key", body = ErrorBody)
    ),
    tags = ["internal"],
    operation_id = "internalListUsers",
    security(("InternalKey" = []))
)]
#[get("/users")]
pub async fn list_users(
    _caller: InternalCaller,
    state: web::Data<HttpState>,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<HttpResponse> {
    let role = query
        .role
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_role(raw, FieldName::new("role")))
        .transpose()?;
    let users = state.directory.list_users(role).await?;
    let views: Vec<UserView> = users.iter().map(UserView::full).collect();
    Ok(Envelope::ok("Users retrieved", views))
}

#[utoipa::path(
    get,
    path = "/internal/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserView),
        (status = 401, description = "Missing or wrong internal key", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tags = ["internal"],
    operation_id = "internalGetUser",
    security(("InternalKey" = []))
)]
#[get("/users/{id}")]
pub async fn get_user(
    _caller: InternalCaller,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner(), USER_ID)?;
    let user = state.directory.get_user(&id).await?;
    Ok(Envelope::ok("User retrieved", UserView::full(&user)))
}

#[utoipa::path(
    put,
    path = "/internal/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserView),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Missing or wrong internal key", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "Conflicting change", body = ErrorBody)
    ),
    tags = ["internal"],
    operation_id = "internalUpdateUser",
    security(("InternalKey" = []))
)]
#[put("/users/{id}")]
pub async fn update_user(
    _caller: InternalCaller,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner(), USER_ID)?;
    let changes = payload.into_inner().into_changes()?;
    let user = state.directory.update_user(&id, changes).await?;
    Ok(Envelope::ok("User updated", UserView::full(&user)))
}

#[utoipa::path(
    delete,
    path = "/internal/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 401, description = "Missing or wrong internal key", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "User has issued invite codes", body = ErrorBody)
    ),
    tags = ["internal"],
    operation_id = "internalDeleteUser",
    security(("InternalKey" = []))
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    _caller: InternalCaller,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner(), USER_ID)?;
    state.directory.delete_user(&id).await?;
    Ok(message_only("User deleted"))
}

#[utoipa::path(
    post,
    path = "/internal/v1/invites",
    request_body = CreateManagedInviteRequest,
    responses(
        (status = 201, description = "Invite created", body = InviteView),
        (status = 400, description = "Invalid request or not a manager", body = ErrorBody),
        (status = 401, description = "Missing or wrong internal key", body = ErrorBody),
        (status = 404, description = "Manager not found", body = ErrorBody),
        (status = 409, description = "Invite code already exists", body = ErrorBody)
    ),
    tags = ["internal"],
    operation_id = "internalCreateInvite",
    security(("InternalKey" = []))
)]
#[post("/invites")]
pub async fn create_invite(
    _caller: InternalCaller,
    state: web::Data<HttpState>,
    payload: web::Json<CreateManagedInviteRequest>,
) -> ApiResult<HttpResponse> {
    let CreateManagedInviteRequest {
        manager_id,
        code,
        expires_at,
        options,
    } = payload.into_inner();
    let manager = parse_user_id(&manager_id, FieldName::new("manager_id"))?;
    let request = InviteRequest {
        expires_at,
        ..options.into()
    };
    let code = state
        .invites
        .issue_on_behalf(&manager, request, code.as_deref())
        .await?;
    Ok(Envelope::created(
        "Invite code created",
        invite_view(&state, &code).await?,
    ))
}

async fn invite_view(state: &HttpState, code: &InviteCode) -> ApiResult<InviteView> {
    let manager_name = state.invites.issuer_name(code).await?;
    Ok(InviteView::new(code, manager_name))
}

#[utoipa::path(
    get,
    path = "/internal/v1/invites/{code}",
    params(("code" = String, Path, description = "Invite code")),
    responses(
        (status = 200, description = "Invite code, valid or not", body = InviteView),
        (status = 401, description = "Missing or wrong internal key", body = ErrorBody),
        (status = 404, description = "Invite code not found", body = ErrorBody)
    ),
    tags = ["internal"],
    operation_id = "internalGetInvite",
    security(("InternalKey" = []))
)]
#[get("/invites/{code}")]
pub async fn get_invite(
    _caller: InternalCaller,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let code = state.invites.find(&path.into_inner()).await?;
    Ok(Envelope::ok(
        "Invite code retrieved",
        invite_view(&state, &code).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/internal/v1/invites/{code}/use",
    params(("code" = String, Path, description = "Invite code")),
    request_body = UseInviteRequest,
    responses(
        (status = 200, description = "Invite redeemed", body = InviteView),
        (status = 400, description = "Invalid or expired invite code", body = ErrorBody),
        (status = 401, description = "Missing or wrong internal key", body = ErrorBody),
        (status = 404, description = "Redeeming user not found", body = ErrorBody)
    ),
    tags = ["internal"],
    operation_id = "internalUseInvite",
    security(("InternalKey" = []))
)]
#[post("/invites/{code}/use")]
pub async fn use_invite(
    _caller: InternalCaller,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UseInviteRequest>,
) -> ApiResult<HttpResponse> {
    let redeemer = parse_user_id(&payload.used_by_id, FieldName::new("used_by_id"))?;
    let code = state.invites.redeem(&path.into_inner(), &redeemer).await?;
    Ok(Envelope::ok(
        "Invite code redeemed",
        invite_view(&state, &code).await?,
    ))
}

#[cfg(test)]
#[path = "internal_tests.rs"]
mod tests;
