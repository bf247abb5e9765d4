//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and never
//! leave it. Conversions into domain types re-validate stored values, so a
//! row written outside the application surfaces as a query error instead of
//! an invalid aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Email, InviteCode, InviteCodeValue, PasswordHash, Role, User, UserId, UserProfile,
};

use super::schema::{invite_codes, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, String> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|error| format!("user {}: {error}", self.id))?;
        let email =
            Email::parse(&self.email).map_err(|error| format!("user {}: {error}", self.id))?;
        Ok(User {
            id: UserId::from_uuid(self.id),
            email,
            password_hash: PasswordHash::new(self.password_hash),
            role,
            profile: UserProfile {
                first_name: self.first_name,
                last_name: self.last_name,
                department: self.department,
                address: self.address,
                date_of_birth: self.date_of_birth,
            },
            manager_id: self.manager_id.map(UserId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub department: Option<&'a str>,
    pub address: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_str(),
            role: user.role.as_str(),
            first_name: user.profile.first_name.as_deref(),
            last_name: user.profile.last_name.as_deref(),
            department: user.profile.department.as_deref(),
            address: user.profile.address.as_deref(),
            date_of_birth: user.profile.date_of_birth,
            manager_id: user.manager_id.map(|id| *id.as_uuid()),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Changeset replacing every mutable user column; `None` writes `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub department: Option<&'a str>,
    pub address: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub manager_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for UserUpdate<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_str(),
            role: user.role.as_str(),
            first_name: user.profile.first_name.as_deref(),
            last_name: user.profile.last_name.as_deref(),
            department: user.profile.department.as_deref(),
            address: user.profile.address.as_deref(),
            date_of_birth: user.profile.date_of_birth,
            manager_id: user.manager_id.map(|id| *id.as_uuid()),
            updated_at: user.updated_at,
        }
    }
}

/// Row struct for the invite_codes table, also used for `RETURNING` rows of
/// raw SQL statements.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = invite_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InviteCodeRow {
    pub code: String,
    pub issuer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub last_used_at: Option<DateTime<Utc>>,
    pub first_redeemer_id: Option<Uuid>,
    pub is_active: bool,
}

impl InviteCodeRow {
    pub(crate) fn into_domain(self) -> Result<InviteCode, String> {
        let code = InviteCodeValue::parse(&self.code)
            .map_err(|error| format!("invite code {}: {error}", self.code))?;
        let max_uses = self
            .max_uses
            .map(u32::try_from)
            .transpose()
            .map_err(|_| format!("invite code {}: negative max_uses", self.code))?;
        let used_count = u32::try_from(self.used_count)
            .map_err(|_| format!("invite code {}: negative used_count", self.code))?;
        Ok(InviteCode {
            code,
            issuer_id: UserId::from_uuid(self.issuer_id),
            created_at: self.created_at,
            expires_at: self.expires_at,
            max_uses,
            used_count,
            last_used_at: self.last_used_at,
            first_redeemer_id: self.first_redeemer_id.map(UserId::from_uuid),
            is_active: self.is_active,
        })
    }
}

/// Insertable struct for issuing invite codes.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invite_codes)]
pub(crate) struct NewInviteCodeRow<'a> {
    pub code: &'a str,
    pub issuer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub is_active: bool,
}

impl<'a> NewInviteCodeRow<'a> {
    pub(crate) fn try_from_domain(code: &'a InviteCode) -> Result<Self, String> {
        let max_uses = code
            .max_uses
            .map(i32::try_from)
            .transpose()
            .map_err(|_| "max_uses exceeds the stored range".to_owned())?;
        let used_count = i32::try_from(code.used_count)
            .map_err(|_| "used_count exceeds the stored range".to_owned())?;
        Ok(Self {
            code: code.code.as_ref(),
            issuer_id: *code.issuer_id.as_uuid(),
            created_at: code.created_at,
            expires_at: code.expires_at,
            max_uses,
            used_count,
            is_active: code.is_active,
        })
    }
}
