//! Shared validation helpers for inbound HTTP adapters.

use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::domain::{Error, ManagerChange, Role, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidRole,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidRole => "invalid_role",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("{name} must be a valid UUID"),
        ErrorCode::InvalidUuid,
        value,
    )
}

/// Parse a path or body identifier.
pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value.trim()).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse an optional identifier; blank strings count as absent.
pub(crate) fn parse_optional_user_id(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<UserId>, Error> {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_user_id(raw, field))
        .transpose()
}

/// Parse a role name such as `manager`.
pub(crate) fn parse_role(value: &str, field: FieldName) -> Result<Role, Error> {
    value.trim().to_ascii_lowercase().parse().map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be one of hr, manager, employee"),
            ErrorCode::InvalidRole,
            value,
        )
    })
}

/// Interpret a `manager_id` update: absent keeps the link, `null` or a blank
/// string clears it, anything else assigns.
pub(crate) fn parse_manager_change(
    value: Option<Option<String>>,
    field: FieldName,
) -> Result<ManagerChange, Error> {
    match value {
        None => Ok(ManagerChange::Keep),
        Some(inner) => Ok(parse_optional_user_id(inner.as_deref(), field)?
            .map_or(ManagerChange::Clear, ManagerChange::Assign)),
    }
}

/// Distinguish an absent field from an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "present")]` on an
/// `Option<Option<T>>` field.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FIELD: FieldName = FieldName::new("manager_id");

    #[rstest]
    fn invalid_uuid_reports_field_and_value() {
        let err = parse_user_id("nope", FIELD).expect_err("rejected");

        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "manager_id");
        assert_eq!(details["value"], "nope");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    #[case(None, ManagerChange::Keep)]
    #[case(Some(None), ManagerChange::Clear)]
    #[case(Some(Some("  ".to_owned())), ManagerChange::Clear)]
    fn manager_change_without_an_id(
        #[case] raw: Option<Option<String>>,
        #[case] expected: ManagerChange,
    ) {
        assert_eq!(parse_manager_change(raw, FIELD).expect("parsed"), expected);
    }

    #[rstest]
    fn manager_change_assigns_a_parsed_id() {
        let id = UserId::random();
        let change =
            parse_manager_change(Some(Some(id.to_string())), FIELD).expect("parsed");

        assert_eq!(change, ManagerChange::Assign(id));
    }

    #[rstest]
    #[case("HR", Role::Hr)]
    #[case(" manager ", Role::Manager)]
    #[case("employee", Role::Employee)]
    fn roles_parse_case_insensitively(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(parse_role(raw, FieldName::new("role")).expect("role"), expected);
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        let err = parse_role("ceo", FieldName::new("role")).expect_err("rejected");

        assert_eq!(err.details().expect("details")["code"], "invalid_role");
    }

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "present")]
        manager_id: Option<Option<String>>,
    }

    #[rstest]
    #[case(r#"{}"#, None)]
    #[case(r#"{"manager_id":null}"#, Some(None))]
    #[case(r#"{"manager_id":"x"}"#, Some(Some("x".to_owned())))]
    fn present_distinguishes_null_from_absent(
        #[case] body: &str,
        #[case] expected: Option<Option<String>>,
    ) {
        let payload: Payload = serde_json::from_str(body).expect("json");
        assert_eq!(payload.manager_id, expected);
    }
}
