//! PostgreSQL-backed `InviteCodeRepository` implementation using Diesel ORM.
//!
//! Redemption is one conditional `UPDATE ... RETURNING`: the validity
//! predicate sits in the `WHERE` clause, so row locking serialises concurrent
//! redeemers and the use cap can never be exceeded.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text, Timestamptz};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{InviteCodePersistenceError, InviteCodeRepository};
use crate::domain::{InviteCode, InviteCodeValue, UserId};

use super::diesel_helpers::{StoreFailure, classify_diesel_error, classify_pool_error, collect_rows};
use super::models::{InviteCodeRow, NewInviteCodeRow};
use super::pool::{DbPool, PoolError};
use super::schema::invite_codes;

const CODE_CONSTRAINT: &str = "invite_codes_pkey";

const REDEEM_SQL: &str = "\
UPDATE invite_codes
SET used_count = used_count + 1,
    last_used_at = $2,
    first_redeemer_id = COALESCE(first_redeemer_id, $3),
    is_active = (max_uses IS NULL OR used_count + 1 < max_uses)
WHERE code = $1
  AND is_active
  AND (expires_at IS NULL OR expires_at > $2)
  AND (max_uses IS NULL OR used_count < max_uses)
RETURNING *";

/// Diesel-backed implementation of the invite code store.
#[derive(Clone)]
pub struct DieselInviteCodeRepository {
    pool: DbPool,
}

impl DieselInviteCodeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_port_error(failure: StoreFailure, code: Option<&InviteCodeValue>) -> InviteCodePersistenceError {
    if failure.violates(CODE_CONSTRAINT) {
        let code = code.map_or_else(String::new, ToString::to_string);
        return InviteCodePersistenceError::duplicate_code(code);
    }
    match failure {
        StoreFailure::Connection(message) => InviteCodePersistenceError::connection(message),
        other => InviteCodePersistenceError::query(other.into_message()),
    }
}

fn map_pool_error(error: PoolError) -> InviteCodePersistenceError {
    to_port_error(classify_pool_error(error), None)
}

fn map_diesel_error(error: diesel::result::Error) -> InviteCodePersistenceError {
    to_port_error(classify_diesel_error(error), None)
}

fn row_to_code(row: Option<InviteCodeRow>) -> Result<Option<InviteCode>, InviteCodePersistenceError> {
    row.map(InviteCodeRow::into_domain)
        .transpose()
        .map_err(InviteCodePersistenceError::query)
}

/// Apply one redemption on `conn`, returning the updated row when the code
/// passed the validity predicate at `now`.
pub(super) async fn redeem_on(
    conn: &mut AsyncPgConnection,
    code: &InviteCodeValue,
    redeemer: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<Option<InviteCodeRow>, diesel::result::Error> {
    diesel::sql_query(REDEEM_SQL)
        .bind::<Text, _>(code.as_ref())
        .bind::<Timestamptz, _>(now)
        .bind::<Nullable<diesel::sql_types::Uuid>, _>(redeemer)
        .get_result::<InviteCodeRow>(conn)
        .await
        .optional()
}

#[async_trait]
impl InviteCodeRepository for DieselInviteCodeRepository {
    async fn insert(&self, code: &InviteCode) -> Result<(), InviteCodePersistenceError> {
        let row = NewInviteCodeRow::try_from_domain(code).map_err(InviteCodePersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(invite_codes::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| to_port_error(classify_diesel_error(error), Some(&code.code)))
    }

    async fn find_by_code(
        &self,
        code: &InviteCodeValue,
    ) -> Result<Option<InviteCode>, InviteCodePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<InviteCodeRow> = invite_codes::table
            .filter(invite_codes::code.eq(code.as_ref()))
            .select(InviteCodeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row_to_code(row)
    }

    async fn list_by_issuer(
        &self,
        issuer: &UserId,
    ) -> Result<Vec<InviteCode>, InviteCodePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<InviteCodeRow> = invite_codes::table
            .filter(invite_codes::issuer_id.eq(issuer.as_uuid()))
            .order((invite_codes::created_at.desc(), invite_codes::code.asc()))
            .select(InviteCodeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(rows, InviteCodeRow::into_domain).map_err(InviteCodePersistenceError::query)
    }

    async fn deactivate(
        &self,
        code: &InviteCodeValue,
        issuer: &UserId,
    ) -> Result<Option<InviteCode>, InviteCodePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<InviteCodeRow> = diesel::update(
            invite_codes::table
                .filter(invite_codes::code.eq(code.as_ref()))
                .filter(invite_codes::issuer_id.eq(issuer.as_uuid())),
        )
        .set(invite_codes::is_active.eq(false))
        .returning(InviteCodeRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row_to_code(row)
    }

    async fn redeem(
        &self,
        code: &InviteCodeValue,
        redeemer: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<InviteCode>, InviteCodePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = redeem_on(&mut conn, code, Some(*redeemer.as_uuid()), now)
            .await
            .map_err(map_diesel_error)?;

        row_to_code(row)
    }
}
