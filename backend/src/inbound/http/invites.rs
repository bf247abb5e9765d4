//! Invite handlers for managers and HR, plus the public validity check.
//!
//! ```text
//! POST /api/v1/invites {"max_uses":5,"expires_in_days":30}
//! GET /api/v1/invites
//! DELETE /api/v1/invites/ABCD123456
//! GET /api/v1/invites/ABCD123456
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::InviteRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::session::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{InviteCheckView, InviteView};

/// Options for a new invite code. Every field is optional.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateInviteRequest {
    /// Use cap; missing or below one means a single use.
    #[serde(default, alias = "maxUses")]
    pub max_uses: Option<i64>,
    /// Uncapped code; overrides `max_uses`.
    #[serde(default)]
    pub unlimited: Option<bool>,
    /// Days until expiry; missing means 90, zero means never.
    #[serde(default, alias = "expiresInDays")]
    pub expires_in_days: Option<i64>,
}

impl From<CreateInviteRequest> for InviteRequest {
    fn from(value: CreateInviteRequest) -> Self {
        Self {
            max_uses: value.max_uses,
            unlimited: value.unlimited.unwrap_or(false),
            expires_in_days: value.expires_in_days,
            expires_at: None,
        }
    }
}

/// Mint an invite code owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/invites",
    request_body = CreateInviteRequest,
    responses(
        (status = 201, description = "Invite created", body = InviteView),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 403, description = "Caller is not a manager or HR", body = ErrorBody)
    ),
    tags = ["invites"],
    operation_id = "createInvite"
)]
#[post("/invites")]
pub async fn create_invite(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateInviteRequest>,
) -> ApiResult<HttpResponse> {
    let code = state
        .invites
        .issue(caller.id(), payload.into_inner().into())
        .await?;
    let manager_name = state.invites.issuer_name(&code).await?;
    Ok(Envelope::created(
        "Invite code created",
        InviteView::new(&code, manager_name),
    ))
}

/// The caller's invite codes, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/invites",
    responses(
        (status = 200, description = "Invite codes", body = [InviteView]),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 403, description = "Caller is not a manager or HR", body = ErrorBody)
    ),
    tags = ["invites"],
    operation_id = "listInvites"
)]
#[get("/invites")]
pub async fn list_invites(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let codes = state.invites.list(caller.id()).await?;
    // Every listed code shares one issuer.
    let manager_name = match codes.first() {
        Some(code) => state.invites.issuer_name(code).await?,
        None => None,
    };
    let views: Vec<InviteView> = codes
        .iter()
        .map(|code| InviteView::new(code, manager_name.clone()))
        .collect();
    Ok(Envelope::ok("Invite codes retrieved", views))
}

/// Deactivate one of the caller's codes.
#[utoipa::path(
    delete,
    path = "/api/v1/invites/{code}",
    params(("code" = String, Path, description = "Invite code")),
    responses(
        (status = 200, description = "Invite revoked", body = InviteView),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 403, description = "Caller is not a manager or HR", body = ErrorBody),
        (status = 404, description = "No such code owned by the caller", body = ErrorBody)
    ),
    tags = ["invites"],
    operation_id = "revokeInvite"
)]
#[delete("/invites/{code}")]
pub async fn revoke_invite(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let code = state.invites.revoke(caller.id(), &path.into_inner()).await?;
    let manager_name = state.invites.issuer_name(&code).await?;
    Ok(Envelope::ok(
        "Invite code revoked",
        InviteView::new(&code, manager_name),
    ))
}

/// Public validity check used by the sign-up form.
#[utoipa::path(
    get,
    path = "/api/v1/invites/{code}",
    params(("code" = String, Path, description = "Invite code")),
    responses(
        (status = 200, description = "Code is valid", body = InviteCheckView),
        (status = 400, description = "Invalid or expired invite code", body = ErrorBody)
    ),
    tags = ["invites"],
    operation_id = "checkInvite",
    security([])
)]
#[get("/invites/{code}")]
pub async fn check_invite(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let code = state.invites.validate(&path.into_inner()).await?;
    Ok(Envelope::ok(
        "Invite code is valid",
        InviteCheckView {
            code: code.code.to_string(),
            valid: true,
            expires_at: code.expires_at,
        },
    ))
}

#[cfg(test)]
#[path = "invites_tests.rs"]
mod tests;
