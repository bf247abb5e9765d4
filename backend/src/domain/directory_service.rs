//! Directory service: HR and manager views over the user hierarchy.
//!
//! Role-gated operations resolve the caller through the
//! [`AuthorizationGuard`]; the trusted variants used by the internal API skip
//! the gate but apply the same record rules.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use tracing::info;

use super::authorization::can_view;
use super::ports::{PasswordHasher, UserRepository, hash_blocking, map_user_persistence_error};
use super::user::{ADDRESS_MAX, DEPARTMENT_MAX, NAME_MAX, optional_text};
use super::{AuthorizationGuard, Email, Error, Password, Role, User, UserId};

const EMPLOYEE_NOT_FOUND: &str = "Employee not found";
const USER_NOT_FOUND: &str = "User not found";

/// How an update treats the manager link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ManagerChange {
    /// Leave the current manager in place.
    #[default]
    Keep,
    /// Remove the manager link.
    Clear,
    /// Report to the given manager.
    Assign(UserId),
}

/// Field changes applied by HR or internal callers. `None` leaves a field
/// untouched; a blank string clears an optional text field.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    /// New login email.
    pub email: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// New role.
    pub role: Option<Role>,
    /// Manager link change.
    pub manager: ManagerChange,
    /// Password reset; internal callers only.
    pub password: Option<Password>,
}

/// Records returned together with the caller they were filtered for, so
/// adapters can decide which fields the caller may see.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewed<T> {
    /// The resolved caller.
    pub viewer: User,
    /// Records visible to the caller.
    pub records: T,
}

/// Directory service.
#[derive(Clone)]
pub struct DirectoryService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    guard: AuthorizationGuard,
    clock: Arc<dyn Clock>,
}

impl DirectoryService {
    /// Assemble the service from its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            guard: AuthorizationGuard::new(users.clone()),
            users,
            hasher,
            clock,
        }
    }

    /// HR sees every employee; a manager sees their direct reports.
    pub async fn list_employees(&self, caller: &UserId) -> Result<Viewed<Vec<User>>, Error> {
        let viewer = self
            .guard
            .require(caller, &[Role::Hr, Role::Manager])
            .await?;
        let records = match viewer.role {
            Role::Hr => self
                .users
                .list_by_role(Role::Employee)
                .await
                .map_err(map_user_persistence_error)?,
            Role::Manager | Role::Employee => self.team_of(&viewer.id).await?,
        };
        Ok(Viewed { viewer, records })
    }

    /// The caller's direct reports.
    pub async fn list_team(&self, caller: &UserId) -> Result<Viewed<Vec<User>>, Error> {
        let viewer = self
            .guard
            .require(caller, &[Role::Manager, Role::Hr])
            .await?;
        let records = self.team_of(&viewer.id).await?;
        Ok(Viewed { viewer, records })
    }

    /// Every user holding the manager role.
    pub async fn list_managers(&self, caller: &UserId) -> Result<Vec<User>, Error> {
        self.guard.require(caller, &[Role::Hr]).await?;
        self.users
            .list_by_role(Role::Manager)
            .await
            .map_err(map_user_persistence_error)
    }

    /// A single record, subject to the visibility filter.
    pub async fn get_employee(&self, caller: &UserId, id: &UserId) -> Result<Viewed<User>, Error> {
        let viewer = self
            .guard
            .require(caller, &[Role::Hr, Role::Manager])
            .await?;
        let target = self.find(id, EMPLOYEE_NOT_FOUND).await?;
        if !can_view(&viewer, &target) {
            return Err(Error::forbidden("Access denied"));
        }
        Ok(Viewed {
            viewer,
            records: target,
        })
    }

    /// HR update of another user's record.
    pub async fn update_employee(
        &self,
        caller: &UserId,
        id: &UserId,
        changes: UserChanges,
    ) -> Result<User, Error> {
        self.guard.require(caller, &[Role::Hr]).await?;
        self.apply_changes(id, changes, EMPLOYEE_NOT_FOUND).await
    }

    /// HR deletion of another user.
    pub async fn delete_employee(&self, caller: &UserId, id: &UserId) -> Result<(), Error> {
        let hr = self.guard.require(caller, &[Role::Hr]).await?;
        if hr.id == *id {
            return Err(Error::invalid_request("You cannot delete your own account"));
        }
        self.remove(id, EMPLOYEE_NOT_FOUND).await
    }

    /// Trusted lookup.
    pub async fn get_user(&self, id: &UserId) -> Result<User, Error> {
        self.find(id, USER_NOT_FOUND).await
    }

    /// Trusted listing with an optional role filter.
    pub async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, Error> {
        let users = match role {
            Some(role) => self.users.list_by_role(role).await,
            None => self.users.list_all().await,
        };
        users.map_err(map_user_persistence_error)
    }

    /// Trusted update.
    pub async fn update_user(&self, id: &UserId, changes: UserChanges) -> Result<User, Error> {
        self.apply_changes(id, changes, USER_NOT_FOUND).await
    }

    /// Trusted deletion.
    pub async fn delete_user(&self, id: &UserId) -> Result<(), Error> {
        self.remove(id, USER_NOT_FOUND).await
    }

    async fn team_of(&self, manager: &UserId) -> Result<Vec<User>, Error> {
        self.users
            .list_by_manager(manager)
            .await
            .map_err(map_user_persistence_error)
    }

    async fn find(&self, id: &UserId, missing: &'static str) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found(missing))
    }

    async fn remove(&self, id: &UserId, missing: &'static str) -> Result<(), Error> {
        let deleted = self
            .users
            .delete(id)
            .await
            .map_err(map_user_persistence_error)?;
        if !deleted {
            return Err(Error::not_found(missing));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    async fn apply_changes(
        &self,
        id: &UserId,
        changes: UserChanges,
        missing: &'static str,
    ) -> Result<User, Error> {
        let mut user = self.find(id, missing).await?;

        if let Some(raw) = changes.email {
            let email = Email::parse(&raw)?;
            if email != user.email {
                let holder = self
                    .users
                    .find_by_email(&email)
                    .await
                    .map_err(map_user_persistence_error)?;
                if holder.is_some_and(|holder| holder.id != user.id) {
                    return Err(Error::conflict("Email already registered"));
                }
                user.email = email;
            }
        }
        if let Some(first_name) = changes.first_name {
            user.profile.first_name = optional_text("first_name", Some(first_name), NAME_MAX)?;
        }
        if let Some(last_name) = changes.last_name {
            user.profile.last_name = optional_text("last_name", Some(last_name), NAME_MAX)?;
        }
        if let Some(department) = changes.department {
            user.profile.department =
                optional_text("department", Some(department), DEPARTMENT_MAX)?;
        }
        if let Some(address) = changes.address {
            user.profile.address = optional_text("address", Some(address), ADDRESS_MAX)?;
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            user.profile.date_of_birth = Some(date_of_birth);
        }

        if let Some(role) = changes.role {
            if user.role == Role::Manager && role != Role::Manager {
                let reports = self.team_of(&user.id).await?;
                if !reports.is_empty() {
                    return Err(Error::conflict(
                        "Cannot change role of a manager with direct reports",
                    ));
                }
            }
            user.role = role;
        }

        match changes.manager {
            ManagerChange::Keep => {}
            ManagerChange::Clear => user.manager_id = None,
            ManagerChange::Assign(manager_id) => {
                self.ensure_assignable(&user.id, &manager_id).await?;
                user.manager_id = Some(manager_id);
            }
        }

        if let Some(password) = changes.password {
            password.check_policy()?;
            user.password_hash = hash_blocking(&self.hasher, &password)
                .await
                .map_err(|error| {
                    tracing::error!(%error, "password hashing failed");
                    Error::internal(error.to_string())
                })?;
        }

        user.updated_at = self.clock.utc();
        self.users
            .update(&user)
            .await
            .map_err(map_user_persistence_error)?;
        info!(user_id = %user.id, role = %user.role, "user updated");
        Ok(user)
    }

    /// `manager_id` must name a manager other than `subject` whose own
    /// reporting chain does not lead back to `subject`.
    async fn ensure_assignable(&self, subject: &UserId, manager_id: &UserId) -> Result<(), Error> {
        if manager_id == subject {
            return Err(Error::invalid_request("A user cannot manage themselves"));
        }
        let manager = self
            .users
            .find_by_id(manager_id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::invalid_request("Assigned manager not found"))?;
        if manager.role != Role::Manager {
            return Err(Error::invalid_request("Assigned user is not a manager"));
        }

        let mut visited = HashSet::from([manager.id]);
        let mut next = manager.manager_id;
        while let Some(current) = next {
            if current == *subject {
                return Err(Error::invalid_request(
                    "Manager assignment would create a reporting cycle",
                ));
            }
            if !visited.insert(current) {
                break;
            }
            next = self
                .users
                .find_by_id(&current)
                .await
                .map_err(map_user_persistence_error)?
                .and_then(|user| user.manager_id);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "directory_service_tests.rs"]
mod tests;
