//! Directory roles.
//!
//! The role set is closed: persisted values outside it are rejected at the
//! store boundary rather than coerced to a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Organisational role held by a directory user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Human resources staff with full directory access.
    Hr,
    /// Line manager who may invite and view direct reports.
    Manager,
    /// Regular employee.
    Employee,
}

impl Role {
    /// Canonical lowercase representation used on the wire and in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hr => "hr",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }
}

/// Render a permitted-role set for error messages, e.g. `hr, manager`.
#[must_use]
pub fn describe_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string does not name a known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {value}")]
pub struct RoleParseError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hr" => Ok(Self::Hr),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            other => Err(RoleParseError {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hr", Role::Hr)]
    #[case("manager", Role::Manager)]
    #[case("employee", Role::Employee)]
    fn parses_canonical_values(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    #[case("HR")]
    #[case("admin")]
    #[case("")]
    fn rejects_unknown_values(#[case] raw: &str) {
        let err = raw.parse::<Role>().expect_err("unknown role");
        assert_eq!(err.value, raw);
    }

    #[rstest]
    fn describes_role_sets() {
        assert_eq!(describe_roles(&[Role::Hr, Role::Manager]), "hr, manager");
    }

    #[rstest]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&Role::Manager).expect("serialise");
        assert_eq!(json, "\"manager\"");
    }
}
