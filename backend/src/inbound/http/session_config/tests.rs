//! Unit tests for session configuration validation.

use super::*;
use rstest::rstest;

const GOOD_SECRET: &str = "0123456789abcdef0123456789abcdef";

#[rstest]
#[case(BuildMode::Debug)]
#[case(BuildMode::Release)]
fn configured_secret_is_used_verbatim(#[case] mode: BuildMode) {
    let settings = session_settings(Some(GOOD_SECRET), 12, mode).expect("settings");

    assert_eq!(settings.secret.as_slice(), GOOD_SECRET.as_bytes());
    assert_eq!(settings.ttl, Duration::hours(12));
    assert!(!settings.ephemeral);
}

#[rstest]
fn release_requires_a_secret() {
    let err = session_settings(None, 24, BuildMode::Release).expect_err("missing secret");

    assert_eq!(err, SessionConfigError::MissingSecret);
}

#[rstest]
fn release_treats_blank_secret_as_missing() {
    let err = session_settings(Some(""), 24, BuildMode::Release).expect_err("blank secret");

    assert_eq!(err, SessionConfigError::MissingSecret);
}

#[rstest]
fn release_rejects_short_secret() {
    let err = session_settings(Some("short"), 24, BuildMode::Release).expect_err("short");

    assert_eq!(
        err,
        SessionConfigError::SecretTooShort {
            length: 5,
            min_len: SECRET_MIN_LEN,
        }
    );
}

#[rstest]
fn debug_accepts_short_secret() {
    let settings = session_settings(Some("short"), 24, BuildMode::Debug).expect("settings");

    assert_eq!(settings.secret.as_slice(), b"short");
}

#[rstest]
fn debug_generates_an_ephemeral_secret() {
    let first = session_settings(None, 24, BuildMode::Debug).expect("settings");
    let second = session_settings(None, 24, BuildMode::Debug).expect("settings");

    assert!(first.ephemeral);
    assert_eq!(first.secret.len(), EPHEMERAL_SECRET_LEN);
    assert_ne!(first.fingerprint(), second.fingerprint());
}

#[rstest]
#[case(0)]
#[case(MAX_TOKEN_TTL_HOURS + 1)]
fn ttl_outside_range_is_rejected(#[case] hours: u32) {
    let err = session_settings(Some(GOOD_SECRET), hours, BuildMode::Debug).expect_err("ttl");

    assert_eq!(
        err,
        SessionConfigError::InvalidTtl {
            value: hours,
            max: MAX_TOKEN_TTL_HOURS,
        }
    );
}

#[rstest]
fn debug_output_shows_fingerprint_not_secret() {
    let settings = session_settings(Some(GOOD_SECRET), 24, BuildMode::Release).expect("settings");
    let rendered = format!("{settings:?}");

    assert!(!rendered.contains(GOOD_SECRET));
    assert!(rendered.contains(&settings.fingerprint()));
}
