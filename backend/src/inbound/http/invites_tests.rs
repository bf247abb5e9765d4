//! Tests for invite handlers.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{InviteRequest, Role};
use crate::inbound::http::test_utils::{TestContext, test_context};

#[rstest]
#[actix_web::test]
async fn manager_mints_with_defaults(test_context: TestContext) {
    let manager = test_context.seed(Role::Manager).await;
    let app = test::init_service(test_context.app()).await;
    let request = test::TestRequest::post()
        .uri("/api/v1/invites")
        .insert_header(test_context.bearer(&manager))
        .set_json(json!({}))
        .to_request();

    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    let data = &body["data"];

    assert_eq!(data["issuer_id"], manager.id.to_string());
    assert_eq!(data["max_uses"], 1);
    assert_eq!(data["used_count"], 0);
    assert_eq!(data["remaining_uses"], 1);
    assert_eq!(data["is_active"], true);
    assert_eq!(data["expires_at"], "2026-05-31T09:00:00Z");
    assert_eq!(data["code"].as_str().map(str::len), Some(10));
}

#[rstest]
#[actix_web::test]
async fn unlimited_never_expiring_codes_have_no_caps(test_context: TestContext) {
    let hr = test_context.seed(Role::Hr).await;
    let app = test::init_service(test_context.app()).await;
    let request = test::TestRequest::post()
        .uri("/api/v1/invites")
        .insert_header(test_context.bearer(&hr))
        .set_json(json!({ "unlimited": true, "expiresInDays": 0 }))
        .to_request();

    let body: Value = test::read_body_json(test::call_service(&app, request).await).await;

    assert_eq!(body["data"]["max_uses"], Value::Null);
    assert_eq!(body["data"]["remaining_uses"], Value::Null);
    assert_eq!(body["data"]["expires_at"], Value::Null);
}

#[rstest]
#[actix_web::test]
async fn employees_cannot_mint(test_context: TestContext) {
    let employee = test_context.seed(Role::Employee).await;
    let app = test::init_service(test_context.app()).await;
    let request = test::TestRequest::post()
        .uri("/api/v1/invites")
        .insert_header(test_context.bearer(&employee))
        .set_json(json!({ "max_uses": 3 }))
        .to_request();

    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "forbidden");
}

#[rstest]
#[actix_web::test]
async fn negative_expiry_is_rejected(test_context: TestContext) {
    let manager = test_context.seed(Role::Manager).await;
    let app = test::init_service(test_context.app()).await;
    let request = test::TestRequest::post()
        .uri("/api/v1/invites")
        .insert_header(test_context.bearer(&manager))
        .set_json(json!({ "expires_in_days": -1 }))
        .to_request();

    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "expires_in_days");
}

#[rstest]
#[actix_web::test]
async fn listing_shows_only_the_callers_codes(test_context: TestContext) {
    let mine = test_context.seed(Role::Manager).await;
    let theirs = test_context.seed(Role::Manager).await;
    test_context
        .seed_invite(&mine, "MINE000001", InviteRequest::default())
        .await;
    test_context
        .seed_invite(&theirs, "THEIRS0001", InviteRequest::default())
        .await;
    let app = test::init_service(test_context.app()).await;
    let request = test::TestRequest::get()
        .uri("/api/v1/invites")
        .insert_header(test_context.bearer(&mine))
        .to_request();

    let body: Value = test::read_body_json(test::call_service(&app, request).await).await;
    let codes: Vec<&str> = body["data"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|code| code["code"].as_str())
        .collect();

    assert_eq!(codes, vec!["MINE000001"]);
}

#[rstest]
#[actix_web::test]
async fn revoking_another_managers_code_is_not_found(test_context: TestContext) {
    let manager_a = test_context.seed(Role::Manager).await;
    let manager_b = test_context.seed(Role::Manager).await;
    test_context
        .seed_invite(&manager_b, "BBBB222222", InviteRequest::default())
        .await;
    let app = test::init_service(test_context.app()).await;

    let request = test::TestRequest::delete()
        .uri("/api/v1/invites/BBBB222222")
        .insert_header(test_context.bearer(&manager_a))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let check = test::TestRequest::get()
        .uri("/api/v1/invites/BBBB222222")
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, check).await).await;
    assert_eq!(body["data"]["valid"], true);
}

#[rstest]
#[actix_web::test]
async fn revoked_codes_fail_the_public_check(test_context: TestContext) {
    let manager = test_context.seed(Role::Manager).await;
    test_context
        .seed_invite(&manager, "REVOKE0001", InviteRequest::default())
        .await;
    let app = test::init_service(test_context.app()).await;

    for _ in 0..2 {
        let request = test::TestRequest::delete()
            .uri("/api/v1/invites/revoke0001")
            .insert_header(test_context.bearer(&manager))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["data"]["is_active"], false);
    }

    let check = test::TestRequest::get()
        .uri("/api/v1/invites/REVOKE0001")
        .to_request();
    let response = test::call_service(&app, check).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_invite");
}

#[rstest]
#[case("NOSUCHCODE")]
#[case("bad-code!")]
#[actix_web::test]
async fn unknown_and_malformed_codes_look_the_same(
    test_context: TestContext,
    #[case] code: &str,
) {
    let app = test::init_service(test_context.app()).await;
    let check = test::TestRequest::get()
        .uri(&format!("/api/v1/invites/{code}"))
        .to_request();

    let response = test::call_service(&app, check).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_invite");
    assert_eq!(body["message"], "Invalid or expired invite code");
}
