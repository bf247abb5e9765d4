//! Tests for user field validation.

use super::*;
use crate::domain::ErrorCode;
use rstest::rstest;

#[rstest]
#[case("a@x.com")]
#[case("first.last+tag@example.co.uk")]
#[case("  padded@example.org  ")]
fn accepts_well_formed_emails(#[case] raw: &str) {
    let email = Email::parse(raw).expect("valid email");
    assert_eq!(email.as_ref(), raw.trim());
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("   ", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::InvalidEmail)]
#[case("a@b", UserValidationError::InvalidEmail)]
#[case("a b@example.com", UserValidationError::InvalidEmail)]
fn rejects_malformed_emails(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Email::parse(raw), Err(expected));
}

#[rstest]
fn rejects_overlong_emails() {
    let local = "a".repeat(EMAIL_MAX);
    let raw = format!("{local}@example.com");
    assert_eq!(
        Email::parse(&raw),
        Err(UserValidationError::EmailTooLong { max: EMAIL_MAX })
    );
}

#[rstest]
fn email_comparison_is_case_sensitive() {
    let lower = Email::parse("a@x.com").expect("valid");
    let upper = Email::parse("A@x.com").expect("valid");
    assert_ne!(lower, upper);
}

#[rstest]
fn user_id_round_trips_through_text() {
    let id = UserId::random();
    let parsed = UserId::new(id.to_string()).expect("valid id");
    assert_eq!(parsed, id);
}

#[rstest]
#[case("")]
#[case("not-a-uuid")]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
fn user_id_rejects_invalid_text(#[case] raw: &str) {
    assert_eq!(UserId::new(raw), Err(UserValidationError::InvalidId));
}

#[rstest]
fn password_hash_debug_is_redacted() {
    let hash = PasswordHash::new("$argon2id$secret".to_owned());
    assert!(!format!("{hash:?}").contains("secret"));
}

#[rstest]
#[case(None, None)]
#[case(Some("   "), None)]
#[case(Some("  Ada "), Some("Ada"))]
fn optional_text_normalises(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
    let value = optional_text("first_name", raw.map(str::to_owned), NAME_MAX).expect("valid");
    assert_eq!(value.as_deref(), expected);
}

#[rstest]
fn profile_rejects_overlong_fields() {
    let input = ProfileInput {
        department: Some("d".repeat(DEPARTMENT_MAX + 1)),
        ..ProfileInput::default()
    };
    assert_eq!(
        input.validate(),
        Err(UserValidationError::FieldTooLong {
            field: "department",
            max: DEPARTMENT_MAX,
        })
    );
}

#[rstest]
fn validation_errors_map_to_invalid_request_with_field_details() {
    let error = Error::from(UserValidationError::InvalidEmail);
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "invalid email format");
    let details = error.details().expect("details");
    assert_eq!(details["field"], "email");
    assert_eq!(details["code"], "invalid_email");
}

#[rstest]
#[case(Some("Ada"), Some("Lovelace"), "Ada Lovelace")]
#[case(Some("Ada"), None, "Ada")]
#[case(None, Some("Lovelace"), "Lovelace")]
fn display_name_joins_present_names(
    #[case] first: Option<&str>,
    #[case] last: Option<&str>,
    #[case] expected: &str,
) {
    let mut user = crate::domain::test_fixtures::user_with_role(crate::domain::Role::Manager);
    user.profile.first_name = first.map(str::to_owned);
    user.profile.last_name = last.map(str::to_owned);

    assert_eq!(user.display_name(), expected);
}

#[rstest]
fn display_name_falls_back_to_the_email() {
    let user = crate::domain::test_fixtures::user_with_role(crate::domain::Role::Manager);

    assert_eq!(user.display_name(), user.email.as_ref());
}
