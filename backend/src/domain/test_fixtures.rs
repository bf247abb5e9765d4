//! Shared builders for domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{Email, PasswordHash, Role, User, UserId, UserProfile};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) struct FixtureClock {
    pub(crate) utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

/// A user with the given role and a unique email.
pub(crate) fn user_with_role(role: Role) -> User {
    let id = UserId::random();
    User {
        id,
        email: Email::parse(&format!("{}-{id}@example.com", role.as_str()))
            .expect("fixture email"),
        password_hash: PasswordHash::new("$argon2id$fixture".to_owned()),
        role,
        profile: UserProfile::default(),
        manager_id: None,
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

/// An employee reporting to `manager`.
pub(crate) fn report_of(manager: &User) -> User {
    User {
        manager_id: Some(manager.id),
        ..user_with_role(Role::Employee)
    }
}
