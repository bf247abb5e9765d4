//! Tests for the in-memory directory store.

use std::sync::Arc;

use chrono::Duration;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::test_fixtures::{fixture_timestamp, report_of, user_with_role};
use crate::domain::InviteTerms;

#[fixture]
fn store() -> InMemoryDirectory {
    InMemoryDirectory::new()
}

fn code(issuer: &User, value: &str, max_uses: Option<u32>) -> InviteCode {
    InviteCode::issue(
        InviteCodeValue::parse(value).expect("code"),
        issuer.id,
        InviteTerms {
            max_uses,
            expires_at: None,
        },
        fixture_timestamp(),
    )
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_rejected_on_insert_and_update(store: InMemoryDirectory) {
    let first = user_with_role(Role::Employee);
    let mut second = user_with_role(Role::Employee);
    UserRepository::insert(&store, &first).await.expect("first insert");
    UserRepository::insert(&store, &second).await.expect("second insert");

    let mut clash = user_with_role(Role::Employee);
    clash.email = first.email.clone();
    let insert = UserRepository::insert(&store, &clash).await;
    second.email = first.email.clone();
    let update = store.update(&second).await;

    assert!(matches!(insert, Err(UserPersistenceError::DuplicateEmail { .. })));
    assert!(matches!(update, Err(UserPersistenceError::DuplicateEmail { .. })));
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_user_is_missing(store: InMemoryDirectory) {
    let ghost = user_with_role(Role::Employee);

    let result = store.update(&ghost).await;

    assert!(matches!(result, Err(UserPersistenceError::Missing { .. })));
}

#[rstest]
#[tokio::test]
async fn delete_clears_manager_and_redeemer_links(store: InMemoryDirectory) {
    let manager = user_with_role(Role::Manager);
    let report = report_of(&manager);
    let issuer = user_with_role(Role::Manager);
    for user in [&manager, &report, &issuer] {
        UserRepository::insert(&store, user).await.expect("insert");
    }
    let issued = code(&issuer, "ABCD123456", Some(2));
    InviteCodeRepository::insert(&store, &issued).await.expect("code");
    InviteCodeRepository::redeem(&store, &issued.code, &manager.id, fixture_timestamp())
        .await
        .expect("redeem")
        .expect("redeemable");

    assert!(store.delete(&manager.id).await.expect("delete"));

    let orphan = store
        .find_by_id(&report.id)
        .await
        .expect("lookup")
        .expect("report survives");
    assert_eq!(orphan.manager_id, None);
    let kept = store
        .find_by_code(&issued.code)
        .await
        .expect("lookup")
        .expect("code survives");
    assert_eq!(kept.first_redeemer_id, None);
    assert_eq!(kept.used_count, 1);
    assert!(!store.delete(&manager.id).await.expect("second delete"));
}

#[rstest]
#[tokio::test]
async fn revoked_code_value_stays_reserved_after_issuer_delete(store: InMemoryDirectory) {
    let first = user_with_role(Role::Manager);
    let second = user_with_role(Role::Manager);
    UserRepository::insert(&store, &first).await.expect("first");
    UserRepository::insert(&store, &second).await.expect("second");
    let issued = code(&first, "ABCD123456", Some(1));
    InviteCodeRepository::insert(&store, &issued).await.expect("code");
    store
        .deactivate(&issued.code, &first.id)
        .await
        .expect("revoke")
        .expect("owned code");

    let delete = store.delete(&first.id).await;
    let reissue = InviteCodeRepository::insert(&store, &code(&second, "ABCD123456", None)).await;

    assert!(matches!(delete, Err(UserPersistenceError::IssuedInvites { .. })));
    assert!(store.find_by_id(&first.id).await.expect("lookup").is_some());
    let revoked = store
        .find_by_code(&issued.code)
        .await
        .expect("lookup")
        .expect("revoked code is kept");
    assert!(!revoked.is_active);
    assert_eq!(revoked.issuer_id, first.id);
    assert!(matches!(
        reissue,
        Err(InviteCodePersistenceError::DuplicateCode { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn listings_are_ordered(store: InMemoryDirectory) {
    let manager = user_with_role(Role::Manager);
    let mut older = report_of(&manager);
    older.created_at = fixture_timestamp() - Duration::days(1);
    let newer = report_of(&manager);
    for user in [&manager, &newer, &older] {
        UserRepository::insert(&store, user).await.expect("insert");
    }
    let mut first_code = code(&manager, "FIRST00001", Some(1));
    first_code.created_at = fixture_timestamp() - Duration::hours(1);
    let second_code = code(&manager, "SECOND0002", Some(1));
    InviteCodeRepository::insert(&store, &first_code).await.expect("first");
    InviteCodeRepository::insert(&store, &second_code).await.expect("second");

    let team = store.list_by_manager(&manager.id).await.expect("team");
    let codes = store.list_by_issuer(&manager.id).await.expect("codes");

    assert_eq!(team, vec![older, newer]);
    assert_eq!(
        codes.iter().map(|code| code.code.as_ref()).collect::<Vec<_>>(),
        vec!["SECOND0002", "FIRST00001"]
    );
}

#[rstest]
#[tokio::test]
async fn deactivate_is_scoped_to_the_issuer(store: InMemoryDirectory) {
    let owner = user_with_role(Role::Manager);
    let other = user_with_role(Role::Manager);
    UserRepository::insert(&store, &owner).await.expect("owner");
    UserRepository::insert(&store, &other).await.expect("other");
    let issued = code(&owner, "ABCD123456", Some(1));
    InviteCodeRepository::insert(&store, &issued).await.expect("code");

    let foreign = store.deactivate(&issued.code, &other.id).await.expect("call");
    let still_active = store
        .find_by_code(&issued.code)
        .await
        .expect("lookup")
        .expect("exists");
    let own = store.deactivate(&issued.code, &owner.id).await.expect("call");

    assert!(foreign.is_none());
    assert!(still_active.is_active);
    assert!(own.is_some_and(|code| !code.is_active));
}

#[rstest]
#[tokio::test]
async fn redeem_applies_accounting_and_stops_at_the_cap(store: InMemoryDirectory) {
    let manager = user_with_role(Role::Manager);
    let first = user_with_role(Role::Employee);
    let second = user_with_role(Role::Employee);
    for user in [&manager, &first, &second] {
        UserRepository::insert(&store, user).await.expect("insert");
    }
    let issued = code(&manager, "ABCD123456", Some(2));
    InviteCodeRepository::insert(&store, &issued).await.expect("code");
    let later = fixture_timestamp() + Duration::minutes(5);

    let once = store
        .redeem(&issued.code, &first.id, fixture_timestamp())
        .await
        .expect("call")
        .expect("first use");
    let twice = store
        .redeem(&issued.code, &second.id, later)
        .await
        .expect("call")
        .expect("second use");
    let third = store
        .redeem(&issued.code, &second.id, later)
        .await
        .expect("call");

    assert_eq!(once.used_count, 1);
    assert!(once.is_active);
    assert_eq!(twice.used_count, 2);
    assert!(!twice.is_active);
    assert_eq!(twice.first_redeemer_id, Some(first.id));
    assert_eq!(twice.last_used_at, Some(later));
    assert!(third.is_none());
}

#[rstest]
#[tokio::test]
async fn failed_enrollment_leaves_no_trace(store: InMemoryDirectory) {
    let manager = user_with_role(Role::Manager);
    UserRepository::insert(&store, &manager).await.expect("manager");
    let mut spent = code(&manager, "ABCD123456", Some(1));
    spent.is_active = false;
    InviteCodeRepository::insert(&store, &spent).await.expect("code");
    let newcomer = report_of(&manager);

    let result = store
        .enroll(&Enrollment {
            user: newcomer.clone(),
            invite: Some(spent.code.clone()),
            at: fixture_timestamp(),
        })
        .await;

    assert!(matches!(result, Err(EnrollmentError::InviteUnavailable { .. })));
    assert!(store.find_by_id(&newcomer.id).await.expect("lookup").is_none());
}

#[rstest]
#[tokio::test]
async fn enrollment_redeems_and_inserts_together(store: InMemoryDirectory) {
    let manager = user_with_role(Role::Manager);
    UserRepository::insert(&store, &manager).await.expect("manager");
    let issued = code(&manager, "ABCD123456", Some(1));
    InviteCodeRepository::insert(&store, &issued).await.expect("code");
    let newcomer = report_of(&manager);

    let redeemed = store
        .enroll(&Enrollment {
            user: newcomer.clone(),
            invite: Some(issued.code.clone()),
            at: fixture_timestamp(),
        })
        .await
        .expect("enrolled")
        .expect("code consumed");

    assert_eq!(redeemed.used_count, 1);
    assert!(!redeemed.is_active);
    assert_eq!(redeemed.first_redeemer_id, Some(newcomer.id));
    assert!(store.find_by_id(&newcomer.id).await.expect("lookup").is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_redemptions_never_exceed_the_cap(store: InMemoryDirectory) {
    let manager = user_with_role(Role::Manager);
    UserRepository::insert(&store, &manager).await.expect("manager");
    let issued = code(&manager, "ABCD123456", Some(3));
    InviteCodeRepository::insert(&store, &issued).await.expect("code");
    let store = Arc::new(store);

    let attempts: Vec<_> = (0..16)
        .map(|_| {
            let store = Arc::clone(&store);
            let value = issued.code.clone();
            tokio::spawn(async move {
                let user = user_with_role(Role::Employee);
                store
                    .enroll(&Enrollment {
                        user,
                        invite: Some(value),
                        at: fixture_timestamp(),
                    })
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for attempt in attempts {
        if attempt.await.expect("task joins").is_ok() {
            successes += 1;
        }
    }

    let final_code = store
        .find_by_code(&issued.code)
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(successes, 3);
    assert_eq!(final_code.used_count, 3);
    assert!(!final_code.is_active);
}
