//! Tests for registration, login and profile handlers.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::ports::{InviteCodeRepository, UserRepository};
use crate::domain::{Email, InviteCodeValue, InviteRequest, Role};
use crate::inbound::http::test_utils::{SEEDED_PASSWORD, TestContext, test_context};

fn single_use_forever() -> InviteRequest {
    InviteRequest {
        max_uses: Some(1),
        unlimited: false,
        expires_in_days: Some(0),
        expires_at: None,
    }
}

#[rstest]
#[actix_web::test]
async fn register_without_invite_creates_unmanaged_employee(test_context: TestContext) {
    let app = test::init_service(test_context.app()).await;
    let request = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "email": "a@x.com",
            "password": "Passw0rd",
            "first_name": "Ada",
        }))
        .to_request();

    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert!(!body["data"]["access_token"].as_str().unwrap_or_default().is_empty());
    assert_eq!(body["data"]["user"]["email"], "a@x.com");
    assert_eq!(body["data"]["user"]["role"], "employee");
    assert_eq!(body["data"]["user"]["manager_id"], Value::Null);
    assert!(body["data"]["user"].get("password_hash").is_none());
}

#[rstest]
#[actix_web::test]
async fn single_use_invite_links_the_manager_then_stops_working(test_context: TestContext) {
    let manager = test_context.seed(Role::Manager).await;
    test_context
        .seed_invite(&manager, "ABCD123456", single_use_forever())
        .await;
    let app = test::init_service(test_context.app()).await;

    let first = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "email": "a@x.com",
            "password": "Passw0rd",
            "inviteCode": "abcd123456",
        }))
        .to_request();
    let response = test::call_service(&app, first).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["data"]["user"]["manager_id"], manager.id.to_string());

    let code = InviteCodeValue::parse("ABCD123456").expect("code");
    let stored = InviteCodeRepository::find_by_code(test_context.store.as_ref(), &code)
        .await
        .expect("lookup")
        .expect("code exists");
    assert_eq!(stored.used_count, 1);
    assert!(!stored.is_active);

    let second = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "email": "b@x.com",
            "password": "Passw0rd",
            "invite_code": "ABCD123456",
        }))
        .to_request();
    let response = test::call_service(&app, second).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_invite");

    let ghost = UserRepository::find_by_email(
        test_context.store.as_ref(),
        &Email::parse("b@x.com").expect("email"),
    )
    .await
    .expect("lookup");
    assert!(ghost.is_none());
}

#[rstest]
#[actix_web::test]
async fn code_is_accepted_as_the_invite_field(test_context: TestContext) {
    let manager = test_context.seed(Role::Manager).await;
    test_context
        .seed_invite(&manager, "ABCD123456", single_use_forever())
        .await;
    let app = test::init_service(test_context.app()).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "email": "a@x.com",
            "password": "Passw0rd",
            "code": "ABCD123456",
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["data"]["user"]["manager_id"], manager.id.to_string());
}

#[rstest]
#[actix_web::test]
async fn short_password_is_rejected_before_any_write(test_context: TestContext) {
    let app = test::init_service(test_context.app()).await;
    let request = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "email": "a@x.com", "password": "short1" }))
        .to_request();

    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;

    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["message"], "Password must be at least 8 characters long");
    assert_eq!(body["details"]["code"], "too_short");
    let users = UserRepository::list_all(test_context.store.as_ref())
        .await
        .expect("list");
    assert!(users.is_empty());
}

#[rstest]
#[actix_web::test]
async fn duplicate_email_is_a_conflict(test_context: TestContext) {
    let existing = test_context.seed(Role::Employee).await;
    let app = test::init_service(test_context.app()).await;
    let request = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "email": existing.email.to_string(), "password": "Passw0rd" }))
        .to_request();

    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "conflict");
}

#[rstest]
#[actix_web::test]
async fn malformed_body_is_an_invalid_request(test_context: TestContext) {
    let app = test::init_service(test_context.app()).await;
    let request = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();

    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[case(SEEDED_PASSWORD, StatusCode::OK)]
#[case("Wr0ngPassword", StatusCode::UNAUTHORIZED)]
#[actix_web::test]
async fn login_checks_the_password(
    test_context: TestContext,
    #[case] password: &str,
    #[case] expected: StatusCode,
) {
    let user = test_context.seed(Role::Employee).await;
    let app = test::init_service(test_context.app()).await;
    let request = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": user.email.to_string(), "password": password }))
        .to_request();

    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn login_token_opens_the_profile(test_context: TestContext) {
    let mut user = crate::domain::test_fixtures::user_with_role(Role::Employee);
    user.profile.address = Some("1 Main St".to_owned());
    let user = test_context.seed_user(user).await;
    let app = test::init_service(test_context.app()).await;

    let login = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": user.email.to_string(), "password": SEEDED_PASSWORD }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, login).await).await;
    let token = body["data"]["access_token"].as_str().expect("token").to_owned();

    let me = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let response = test::call_service(&app, me).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;

    assert_eq!(body["message"], "Profile retrieved");
    assert_eq!(body["data"]["id"], user.id.to_string());
    assert_eq!(body["data"]["address"], "1 Main St");
}

#[rstest]
#[case(None)]
#[case(Some("Bearer not-a-token"))]
#[actix_web::test]
async fn profile_requires_a_valid_token(test_context: TestContext, #[case] header: Option<&str>) {
    let app = test::init_service(test_context.app()).await;
    let mut request = test::TestRequest::get().uri("/api/v1/users/me");
    if let Some(value) = header {
        request = request.insert_header(("Authorization", value));
    }

    let response = test::call_service(&app, request.to_request()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn password_change_needs_the_current_password(test_context: TestContext) {
    let user = test_context.seed(Role::Employee).await;
    let app = test::init_service(test_context.app()).await;

    let missing = test::TestRequest::put()
        .uri("/api/v1/users/me")
        .insert_header(test_context.bearer(&user))
        .set_json(json!({ "new_password": "N3wPassword" }))
        .to_request();
    let response = test::call_service(&app, missing).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let wrong = test::TestRequest::put()
        .uri("/api/v1/users/me")
        .insert_header(test_context.bearer(&user))
        .set_json(json!({ "currentPassword": "Wr0ngPassword", "newPassword": "N3wPassword" }))
        .to_request();
    let response = test::call_service(&app, wrong).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"], "Current password is incorrect");

    let right = test::TestRequest::put()
        .uri("/api/v1/users/me")
        .insert_header(test_context.bearer(&user))
        .set_json(json!({
            "first_name": "Grace",
            "current_password": SEEDED_PASSWORD,
            "new_password": "N3wPassword",
        }))
        .to_request();
    let response = test::call_service(&app, right).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["data"]["first_name"], "Grace");

    let login = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": user.email.to_string(), "password": "N3wPassword" }))
        .to_request();
    assert_eq!(test::call_service(&app, login).await.status(), StatusCode::OK);
}
