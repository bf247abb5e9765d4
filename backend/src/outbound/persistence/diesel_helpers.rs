//! Shared error classification for Diesel repository implementations.
//!
//! Each adapter owns a different port error type, so Diesel and pool errors
//! are first reduced to a [`StoreFailure`] and then converted by the adapter.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Adapter-neutral classification of a database failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    /// Pool checkout failed or the connection dropped.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key still references the row being removed.
    ForeignKeyViolation { constraint: Option<String> },
    /// Any other query failure.
    Query(String),
}

impl StoreFailure {
    /// Whether the failure is a unique violation on `constraint`.
    pub(crate) fn violates(&self, constraint: &str) -> bool {
        matches!(
            self,
            Self::UniqueViolation { constraint: Some(name) } if name == constraint
        )
    }

    /// Whether the failure is a foreign key violation on `constraint`.
    pub(crate) fn still_referenced_by(&self, constraint: &str) -> bool {
        matches!(
            self,
            Self::ForeignKeyViolation { constraint: Some(name) } if name == constraint
        )
    }

    /// Message for port error variants that carry one.
    pub(crate) fn into_message(self) -> String {
        match self {
            Self::Connection(message) | Self::Query(message) => message,
            Self::UniqueViolation { constraint } => format!(
                "unique constraint violated: {}",
                constraint.as_deref().unwrap_or("unknown")
            ),
            Self::ForeignKeyViolation { constraint } => format!(
                "foreign key violated: {}",
                constraint.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

/// Classify a pool error.
pub(crate) fn classify_pool_error(error: PoolError) -> StoreFailure {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreFailure::Connection(message)
        }
    }
}

/// Classify a Diesel error, logging driver details at debug level only.
pub(crate) fn classify_diesel_error(error: DieselError) -> StoreFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            StoreFailure::ForeignKeyViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreFailure::Connection("database connection error".to_owned())
        }
        DieselError::NotFound => StoreFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => StoreFailure::Query("database query error".to_owned()),
        _ => StoreFailure::Query("database error".to_owned()),
    }
}

/// Convert rows into domain values, failing on the first bad row.
pub(crate) fn collect_rows<R, T>(
    rows: Vec<R>,
    convert: impl Fn(R) -> Result<T, String>,
) -> Result<Vec<T>, String> {
    rows.into_iter().map(convert).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_are_connection_failures() {
        let failure = classify_pool_error(PoolError::checkout("timed out"));
        assert_eq!(failure, StoreFailure::Connection("timed out".to_owned()));
    }

    #[rstest]
    #[case(DieselError::NotFound)]
    #[case(DieselError::RollbackTransaction)]
    fn other_diesel_errors_are_query_failures(#[case] error: DieselError) {
        assert!(matches!(classify_diesel_error(error), StoreFailure::Query(_)));
    }

    #[rstest]
    fn violates_matches_only_the_named_constraint() {
        let failure = StoreFailure::UniqueViolation {
            constraint: Some("users_email_key".to_owned()),
        };

        assert!(failure.violates("users_email_key"));
        assert!(!failure.violates("invite_codes_pkey"));
        assert!(!StoreFailure::Query("x".to_owned()).violates("users_email_key"));
    }

    #[rstest]
    fn foreign_key_failures_are_not_unique_violations() {
        let failure = StoreFailure::ForeignKeyViolation {
            constraint: Some("invite_codes_issuer_fkey".to_owned()),
        };

        assert!(failure.still_referenced_by("invite_codes_issuer_fkey"));
        assert!(!failure.violates("invite_codes_issuer_fkey"));
        assert_eq!(
            failure.into_message(),
            "foreign key violated: invite_codes_issuer_fkey"
        );
    }

    #[rstest]
    fn collect_rows_stops_at_the_first_error() {
        let result = collect_rows(vec![1, -1, 2], |value: i32| {
            u32::try_from(value).map_err(|_| format!("negative: {value}"))
        });

        assert_eq!(result, Err("negative: -1".to_owned()));
    }
}
