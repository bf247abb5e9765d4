//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Directory users.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Login email, unique and case-sensitive.
        #[max_length = 120]
        email -> Varchar,
        /// Argon2id PHC string.
        #[max_length = 255]
        password_hash -> Varchar,
        /// One of `hr`, `manager`, `employee`.
        #[max_length = 20]
        role -> Varchar,
        #[max_length = 50]
        first_name -> Nullable<Varchar>,
        #[max_length = 50]
        last_name -> Nullable<Varchar>,
        #[max_length = 100]
        department -> Nullable<Varchar>,
        #[max_length = 200]
        address -> Nullable<Varchar>,
        date_of_birth -> Nullable<Date>,
        /// Direct manager; cleared when the manager is deleted.
        manager_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Invite codes gating self-registration.
    invite_codes (code) {
        /// Normalised code text.
        #[max_length = 32]
        code -> Varchar,
        /// Issuing manager or HR user; codes are deleted with their issuer.
        issuer_id -> Uuid,
        created_at -> Timestamptz,
        /// `NULL` never expires.
        expires_at -> Nullable<Timestamptz>,
        /// `NULL` is unlimited.
        max_uses -> Nullable<Int4>,
        used_count -> Int4,
        last_used_at -> Nullable<Timestamptz>,
        first_redeemer_id -> Nullable<Uuid>,
        is_active -> Bool,
    }
}

diesel::joinable!(invite_codes -> users (issuer_id));
diesel::allow_tables_to_appear_in_same_query!(users, invite_codes);
