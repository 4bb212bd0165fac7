//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `email` is unique case-insensitively via the
    /// `users_email_lower_idx` index; values are stored lower-cased.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        first_name -> Varchar,
        middle_name -> Nullable<Varchar>,
        last_name -> Varchar,
        birth_date -> Timestamptz,
        role -> Varchar,
        status_update_frequency -> Int4,
        is_location_shared -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Live sessions. Exactly one of `user_id` and `anonymous_id` is set.
    sessions (id) {
        /// Hex SHA-256 of the session token.
        id -> Varchar,
        user_id -> Nullable<Uuid>,
        anonymous_id -> Nullable<Varchar>,
        expires_at -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    disaster_reports (id) {
        id -> Uuid,
        reporter_id -> Nullable<Varchar>,
        name -> Varchar,
        status -> Varchar,
        raw_situation -> Text,
        photo_urls -> Array<Text>,
        responder_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(sessions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, sessions, disaster_reports);
