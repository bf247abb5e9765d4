//! PostgreSQL-backed `EnrollmentRepository` implementation.
//!
//! The user row is inserted first so the redemption can record them as first
//! redeemer; if the code then fails its validity predicate the transaction
//! rolls back and the user never existed.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::InviteCode;
use crate::domain::ports::{Enrollment, EnrollmentError, EnrollmentRepository};

use super::diesel_helpers::{StoreFailure, classify_diesel_error, classify_pool_error};
use super::diesel_invite_code_repository::redeem_on;
use super::models::{InviteCodeRow, NewUserRow};
use super::pool::DbPool;
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed registration unit of work.
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    pool: DbPool,
}

impl DieselEnrollmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside the enrollment transaction.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    InviteUnavailable,
}

impl From<diesel::result::Error> for TxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

fn to_port_error(failure: StoreFailure, enrollment: &Enrollment) -> EnrollmentError {
    if failure.violates(EMAIL_CONSTRAINT) {
        return EnrollmentError::duplicate_email(enrollment.user.email.as_ref());
    }
    match failure {
        StoreFailure::Connection(message) => EnrollmentError::connection(message),
        other => EnrollmentError::query(other.into_message()),
    }
}

fn map_tx_error(error: TxError, enrollment: &Enrollment) -> EnrollmentError {
    match error {
        TxError::Diesel(error) => to_port_error(classify_diesel_error(error), enrollment),
        TxError::InviteUnavailable => {
            let code = enrollment
                .invite
                .as_ref()
                .map_or_else(String::new, ToString::to_string);
            EnrollmentError::invite_unavailable(code)
        }
    }
}

#[async_trait]
impl EnrollmentRepository for DieselEnrollmentRepository {
    async fn enroll(&self, enrollment: &Enrollment) -> Result<Option<InviteCode>, EnrollmentError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|error| to_port_error(classify_pool_error(error), enrollment))?;
        let row = NewUserRow::from(&enrollment.user);
        let redeemer = *enrollment.user.id.as_uuid();

        let redeemed: Option<InviteCodeRow> = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    diesel::insert_into(users::table)
                        .values(&row)
                        .execute(conn)
                        .await?;

                    match enrollment.invite.as_ref() {
                        Some(code) => redeem_on(conn, code, Some(redeemer), enrollment.at)
                            .await?
                            .map(Some)
                            .ok_or(TxError::InviteUnavailable),
                        None => Ok(None),
                    }
                }
                .scope_boxed()
            })
            .await
            .map_err(|error| map_tx_error(error, enrollment))?;

        redeemed
            .map(InviteCodeRow::into_domain)
            .transpose()
            .map_err(EnrollmentError::query)
    }
}
