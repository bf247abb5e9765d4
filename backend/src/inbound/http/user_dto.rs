//! Request bodies shared by the HR and internal user endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, NewAccount, Password, ProfileInput, Role, UserChanges};
use crate::inbound::http::validation::{
    FieldName, parse_manager_change, parse_optional_user_id, parse_role, present,
};

const ROLE: FieldName = FieldName::new("role");
const MANAGER_ID: FieldName = FieldName::new("manager_id");

/// Body for creating a user on someone else's behalf.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    /// `hr`, `manager` or `employee`; defaults to `employee`.
    #[serde(default)]
    pub role: Option<String>,
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
    /// Must name a user holding the manager role.
    #[serde(default, alias = "managerId")]
    pub manager_id: Option<String>,
}

impl TryFrom<CreateUserRequest> for NewAccount {
    type Error = Error;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        let role = match value.role.as_deref().map(str::trim) {
            None | Some("") => Role::Employee,
            Some(raw) => parse_role(raw, ROLE)?,
        };
        Ok(Self {
            email: value.email,
            password: Password::unchecked(value.password),
            role,
            profile: ProfileInput {
                first_name: value.first_name,
                last_name: value.last_name,
                department: value.department,
                address: value.address,
                date_of_birth: value.date_of_birth,
            },
            manager_id: parse_optional_user_id(value.manager_id.as_deref(), MANAGER_ID)?,
        })
    }
}

/// Partial update. Absent fields are left alone; `"manager_id": null`
/// removes the manager link.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
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
    #[serde(default, alias = "managerId", deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub manager_id: Option<Option<String>>,
    /// Password reset; accepted on the internal API only.
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    /// Changes for an HR caller, who may not reset passwords here.
    pub fn into_hr_changes(self) -> Result<UserChanges, Error> {
        if self.password.is_some() {
            return Err(Error::invalid_request(
                "Passwords cannot be changed through this endpoint",
            )
            .with_details(json!({ "field": "password" })));
        }
        self.into_changes()
    }

    /// Changes for a trusted caller, including a password reset.
    pub fn into_changes(self) -> Result<UserChanges, Error> {
        let role = self
            .role
            .as_deref()
            .map(|raw| parse_role(raw, ROLE))
            .transpose()?;
        Ok(UserChanges {
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            department: self.department,
            address: self.address,
            date_of_birth: self.date_of_birth,
            role,
            manager: parse_manager_change(self.manager_id, MANAGER_ID)?,
            password: self.password.map(Password::unchecked),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, ManagerChange, UserId};
    use rstest::rstest;

    #[rstest]
    fn create_defaults_to_employee_without_manager() {
        let body: CreateUserRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"Passw0rd"}"#).expect("json");
        let account = NewAccount::try_from(body).expect("account");

        assert_eq!(account.role, Role::Employee);
        assert!(account.manager_id.is_none());
    }

    #[rstest]
    fn create_accepts_camel_case_manager() {
        let manager = UserId::random();
        let body: CreateUserRequest = serde_json::from_value(json!({
            "email": "a@x.com",
            "password": "Passw0rd",
            "role": "manager",
            "managerId": manager.to_string(),
        }))
        .expect("json");
        let account = NewAccount::try_from(body).expect("account");

        assert_eq!(account.role, Role::Manager);
        assert_eq!(account.manager_id, Some(manager));
    }

    #[rstest]
    fn update_with_null_manager_clears_the_link() {
        let body: UpdateUserRequest =
            serde_json::from_str(r#"{"manager_id":null,"department":"Ops"}"#).expect("json");
        let changes = body.into_hr_changes().expect("changes");

        assert_eq!(changes.manager, ManagerChange::Clear);
        assert_eq!(changes.department.as_deref(), Some("Ops"));
    }

    #[rstest]
    fn hr_changes_refuse_password_resets() {
        let body = UpdateUserRequest {
            password: Some("N3wPassword".to_owned()),
            ..UpdateUserRequest::default()
        };
        let err = body.into_hr_changes().expect_err("rejected");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn trusted_changes_carry_password_resets() {
        let body = UpdateUserRequest {
            password: Some("N3wPassword".to_owned()),
            ..UpdateUserRequest::default()
        };
        let changes = body.into_changes().expect("changes");

        assert_eq!(
            changes.password.as_ref().map(Password::expose),
            Some("N3wPassword")
        );
        assert_eq!(changes.manager, ManagerChange::Keep);
    }
}
