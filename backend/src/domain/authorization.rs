//! Authorization guard: resolves a caller and enforces role gates.
//!
//! Roles are always read from the store at request time, so a promotion or
//! demotion takes effect on the caller's next request.

use std::sync::Arc;

use super::ports::{UserRepository, map_user_persistence_error};
use super::{Error, Role, User, UserId, describe_roles};

/// Role gate shared by every protected operation.
#[derive(Clone)]
pub struct AuthorizationGuard {
    users: Arc<dyn UserRepository>,
}

impl AuthorizationGuard {
    /// Build a guard backed by the Identity Store.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Resolve `caller` to a stored user.
    ///
    /// A token whose user has since been deleted is treated as
    /// unauthenticated.
    pub async fn authenticate(&self, caller: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(caller)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::unauthorized("User not found"))
    }

    /// Resolve `caller` and require one of `allowed`.
    pub async fn require(&self, caller: &UserId, allowed: &[Role]) -> Result<User, Error> {
        let user = self.authenticate(caller).await?;
        if allowed.contains(&user.role) {
            return Ok(user);
        }
        tracing::debug!(user_id = %user.id, role = %user.role, "role gate rejected caller");
        Err(Error::forbidden(format!(
            "Access denied. Required role(s): {}",
            describe_roles(allowed)
        )))
    }
}

/// Whether `viewer` may read `target`'s record.
///
/// HR sees everyone, a manager sees themselves and direct reports, and an
/// employee sees only themselves.
#[must_use]
pub fn can_view(viewer: &User, target: &User) -> bool {
    match viewer.role {
        Role::Hr => true,
        Role::Manager => viewer.id == target.id || target.reports_to(&viewer.id),
        Role::Employee => viewer.id == target.id,
    }
}

/// Whether `viewer` may see `target`'s personal fields (address, date of
/// birth): HR and the user themselves.
#[must_use]
pub fn sees_personal_details(viewer: &User, target: &User) -> bool {
    viewer.role == Role::Hr || viewer.id == target.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockUserRepository, UserPersistenceError};
    use crate::domain::test_fixtures::{report_of, user_with_role};
    use rstest::rstest;

    fn guard_with(user: Option<User>) -> AuthorizationGuard {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(user));
        AuthorizationGuard::new(Arc::new(repo))
    }

    #[rstest]
    #[case(Role::Hr, &[Role::Hr], true)]
    #[case(Role::Manager, &[Role::Manager, Role::Hr], true)]
    #[case(Role::Employee, &[Role::Manager, Role::Hr], false)]
    #[case(Role::Manager, &[Role::Hr], false)]
    #[tokio::test]
    async fn require_checks_current_role(
        #[case] role: Role,
        #[case] allowed: &'static [Role],
        #[case] permitted: bool,
    ) {
        let user = user_with_role(role);
        let id = user.id;
        let guard = guard_with(Some(user));

        let result = guard.require(&id, allowed).await;

        assert_eq!(result.is_ok(), permitted);
        if let Err(error) = result {
            assert_eq!(error.code(), ErrorCode::Forbidden);
        }
    }

    #[tokio::test]
    async fn forbidden_message_lists_permitted_roles() {
        let user = user_with_role(Role::Employee);
        let id = user.id;
        let guard = guard_with(Some(user));

        let error = guard
            .require(&id, &[Role::Hr, Role::Manager])
            .await
            .expect_err("employee is rejected");

        assert_eq!(error.message(), "Access denied. Required role(s): hr, manager");
    }

    #[tokio::test]
    async fn unknown_caller_is_unauthorized() {
        let guard = guard_with(None);

        let error = guard
            .require(&UserId::random(), &[Role::Hr])
            .await
            .expect_err("missing user");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), "User not found");
    }

    #[tokio::test]
    async fn store_outage_is_service_unavailable() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .return_once(|_| Err(UserPersistenceError::connection("refused")));
        let guard = AuthorizationGuard::new(Arc::new(repo));

        let error = guard
            .authenticate(&UserId::random())
            .await
            .expect_err("outage");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    fn visibility_follows_reporting_lines() {
        let hr = user_with_role(Role::Hr);
        let manager = user_with_role(Role::Manager);
        let other_manager = user_with_role(Role::Manager);
        let report = report_of(&manager);
        let stranger = user_with_role(Role::Employee);

        assert!(can_view(&hr, &stranger));
        assert!(can_view(&manager, &report));
        assert!(can_view(&manager, &manager));
        assert!(!can_view(&other_manager, &report));
        assert!(can_view(&report, &report));
        assert!(!can_view(&report, &manager));
        assert!(!can_view(&stranger, &report));
    }

    #[rstest]
    fn personal_details_are_for_hr_and_self() {
        let hr = user_with_role(Role::Hr);
        let manager = user_with_role(Role::Manager);
        let report = report_of(&manager);

        assert!(sees_personal_details(&hr, &report));
        assert!(sees_personal_details(&report, &report));
        assert!(!sees_personal_details(&manager, &report));
    }
}
