//! Response DTOs shared by the handlers.
//!
//! Domain types do not derive `Serialize`; these views decide what leaves
//! the process. Password hashes never appear here, and the personal fields
//! are filled only for callers entitled to them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::SessionToken;
use crate::domain::{InviteCode, Role, User};
use crate::inbound::http::schemas::RoleSchema;

/// A directory user as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    pub id: Uuid,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(value_type = RoleSchema, example = "employee")]
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub manager_id: Option<Uuid>,
    /// Present for HR, the user themselves and internal callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Present for HR, the user themselves and internal callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserView {
    /// Every non-secret field.
    #[must_use]
    pub fn full(user: &User) -> Self {
        let mut view = Self::public(user);
        view.address = user.profile.address.clone();
        view.date_of_birth = user.profile.date_of_birth;
        view
    }

    /// Without address and date of birth.
    #[must_use]
    pub fn public(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: user.email.to_string(),
            role: user.role,
            first_name: user.profile.first_name.clone(),
            last_name: user.profile.last_name.clone(),
            department: user.profile.department.clone(),
            manager_id: user.manager_id.map(|id| *id.as_uuid()),
            address: None,
            date_of_birth: None,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    /// `full` when `personal` is set, `public` otherwise.
    #[must_use]
    pub fn for_viewer(user: &User, personal: bool) -> Self {
        if personal {
            Self::full(user)
        } else {
            Self::public(user)
        }
    }
}

/// An invite code as returned to its issuer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InviteView {
    #[schema(example = "ABCD123456")]
    pub code: String,
    pub issuer_id: Uuid,
    /// Issuer's full name, or their email when they have none.
    #[schema(example = "Lee Adams")]
    pub manager_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// `null` is unlimited.
    pub max_uses: Option<u32>,
    pub used_count: u32,
    pub remaining_uses: Option<u32>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub first_redeemer_id: Option<Uuid>,
    pub is_active: bool,
}

impl InviteView {
    /// View of `code` labelled with its issuer's display name.
    #[must_use]
    pub fn new(code: &InviteCode, manager_name: Option<String>) -> Self {
        Self {
            code: code.code.to_string(),
            issuer_id: *code.issuer_id.as_uuid(),
            manager_name,
            created_at: code.created_at,
            expires_at: code.expires_at,
            max_uses: code.max_uses,
            used_count: code.used_count,
            remaining_uses: code.remaining_uses(),
            last_used_at: code.last_used_at,
            first_redeemer_id: code.first_redeemer_id.map(|id| *id.as_uuid()),
            is_active: code.is_active,
        }
    }
}

/// Public answer to an invite check; reveals nothing about the issuer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InviteCheckView {
    pub code: String,
    pub valid: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A bearer token and the user it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionView {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserView,
}

impl SessionView {
    /// The session plus the user's own full view.
    #[must_use]
    pub fn new(user: &User, session: SessionToken) -> Self {
        Self {
            access_token: session.access_token,
            token_type: "Bearer".to_owned(),
            expires_at: session.expires_at,
            user: UserView::full(user),
        }
    }
}
