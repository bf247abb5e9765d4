//! In-process store implementing every directory port.
//!
//! One mutex guards users and invite codes together, so each port call is a
//! single critical section. That gives redemption and enrollment the same
//! all-or-nothing behaviour the PostgreSQL adapter gets from a transaction.
//! Deleting a user mirrors the database foreign keys: reports lose their
//! manager and redeemer links are cleared, but a user who issued invite codes
//! cannot be deleted because codes are never removed.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    Enrollment, EnrollmentError, EnrollmentRepository, InviteCodePersistenceError,
    InviteCodeRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{Email, InviteCode, InviteCodeValue, Role, User, UserId};

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<UserId, User>,
    codes: BTreeMap<InviteCodeValue, InviteCode>,
}

impl Store {
    fn email_taken(&self, email: &Email, except: Option<&UserId>) -> bool {
        self.users
            .values()
            .any(|user| user.email == *email && Some(&user.id) != except)
    }

    fn users_where(&self, predicate: impl Fn(&User) -> bool) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .values()
            .filter(|user| predicate(user))
            .cloned()
            .collect();
        users.sort_by_key(|user| (user.created_at, user.id));
        users
    }

    fn redeem(
        &mut self,
        code: &InviteCodeValue,
        redeemer: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Option<InviteCode> {
        let stored = self.codes.get_mut(code)?;
        let next = stored.redeemed(redeemer, now)?;
        *stored = next.clone();
        Some(next)
    }
}

const POISONED: &str = "directory store lock poisoned";

/// Shared in-memory directory; clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    inner: Arc<Mutex<Store>>,
}

impl InMemoryDirectory {
    /// An empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, &'static str> {
        self.inner.lock().map_err(|_| POISONED)
    }
}

#[async_trait]
impl UserRepository for InMemoryDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let store = self.lock().map_err(UserPersistenceError::query)?;
        Ok(store.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let store = self.lock().map_err(UserPersistenceError::query)?;
        Ok(store.users.values().find(|user| user.email == *email).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut store = self.lock().map_err(UserPersistenceError::query)?;
        if store.email_taken(&user.email, None) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        if store.users.contains_key(&user.id) {
            return Err(UserPersistenceError::query("duplicate user id"));
        }
        store.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut store = self.lock().map_err(UserPersistenceError::query)?;
        if !store.users.contains_key(&user.id) {
            return Err(UserPersistenceError::missing(user.id.to_string()));
        }
        if store.email_taken(&user.email, Some(&user.id)) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        store.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut store = self.lock().map_err(UserPersistenceError::query)?;
        if !store.users.contains_key(id) {
            return Ok(false);
        }
        if store.codes.values().any(|code| code.issuer_id == *id) {
            return Err(UserPersistenceError::issued_invites(id.to_string()));
        }
        store.users.remove(id);
        for user in store.users.values_mut() {
            if user.manager_id.as_ref() == Some(id) {
                user.manager_id = None;
            }
        }
        for code in store.codes.values_mut() {
            if code.first_redeemer_id.as_ref() == Some(id) {
                code.first_redeemer_id = None;
            }
        }
        Ok(true)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let store = self.lock().map_err(UserPersistenceError::query)?;
        Ok(store.users_where(|_| true))
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserPersistenceError> {
        let store = self.lock().map_err(UserPersistenceError::query)?;
        Ok(store.users_where(|user| user.role == role))
    }

    async fn list_by_manager(&self, manager: &UserId) -> Result<Vec<User>, UserPersistenceError> {
        let store = self.lock().map_err(UserPersistenceError::query)?;
        Ok(store.users_where(|user| user.reports_to(manager)))
    }
}

#[async_trait]
impl InviteCodeRepository for InMemoryDirectory {
    async fn insert(&self, code: &InviteCode) -> Result<(), InviteCodePersistenceError> {
        let mut store = self.lock().map_err(InviteCodePersistenceError::query)?;
        if store.codes.contains_key(&code.code) {
            return Err(InviteCodePersistenceError::duplicate_code(code.code.as_ref()));
        }
        if !store.users.contains_key(&code.issuer_id) {
            return Err(InviteCodePersistenceError::query("issuer does not exist"));
        }
        store.codes.insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn find_by_code(
        &self,
        code: &InviteCodeValue,
    ) -> Result<Option<InviteCode>, InviteCodePersistenceError> {
        let store = self.lock().map_err(InviteCodePersistenceError::query)?;
        Ok(store.codes.get(code).cloned())
    }

    async fn list_by_issuer(
        &self,
        issuer: &UserId,
    ) -> Result<Vec<InviteCode>, InviteCodePersistenceError> {
        let store = self.lock().map_err(InviteCodePersistenceError::query)?;
        let mut codes: Vec<InviteCode> = store
            .codes
            .values()
            .filter(|code| code.issuer_id == *issuer)
            .cloned()
            .collect();
        codes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.code.cmp(&b.code))
        });
        Ok(codes)
    }

    async fn deactivate(
        &self,
        code: &InviteCodeValue,
        issuer: &UserId,
    ) -> Result<Option<InviteCode>, InviteCodePersistenceError> {
        let mut store = self.lock().map_err(InviteCodePersistenceError::query)?;
        let Some(stored) = store
            .codes
            .get_mut(code)
            .filter(|stored| stored.issuer_id == *issuer)
        else {
            return Ok(None);
        };
        stored.is_active = false;
        Ok(Some(stored.clone()))
    }

    async fn redeem(
        &self,
        code: &InviteCodeValue,
        redeemer: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<InviteCode>, InviteCodePersistenceError> {
        let mut store = self.lock().map_err(InviteCodePersistenceError::query)?;
        Ok(store.redeem(code, Some(*redeemer), now))
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryDirectory {
    async fn enroll(&self, enrollment: &Enrollment) -> Result<Option<InviteCode>, EnrollmentError> {
        let mut store = self.lock().map_err(EnrollmentError::query)?;
        let user = &enrollment.user;
        if store.email_taken(&user.email, None) {
            return Err(EnrollmentError::duplicate_email(user.email.as_ref()));
        }
        if store.users.contains_key(&user.id) {
            return Err(EnrollmentError::query("duplicate user id"));
        }

        let redeemed = match enrollment.invite.as_ref() {
            Some(code) => Some(
                store
                    .redeem(code, Some(user.id), enrollment.at)
                    .ok_or_else(|| EnrollmentError::invite_unavailable(code.as_ref()))?,
            ),
            None => None,
        };
        store.users.insert(user.id, user.clone());
        Ok(redeemed)
    }
}

#[cfg(test)]
mod tests;
