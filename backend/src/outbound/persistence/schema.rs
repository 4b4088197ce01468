//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. The
//! `diesel print-schema` command can regenerate them from a live database.

diesel::table! {
    /// User documents.
    ///
    /// Scalar profile fields are columns; the address list is stored as a
    /// JSONB array so each user stays a single document.
    users (user_id) {
        /// Primary key: UUID v4 identifier.
        user_id -> Uuid,
        /// User type code (1..=255).
        user_type -> Int4,
        first_name -> Varchar,
        last_name -> Varchar,
        email -> Varchar,
        company -> Nullable<Varchar>,
        /// Array of address documents with their own timestamps.
        addresses -> Jsonb,
        date_created -> Timestamptz,
        date_modified -> Timestamptz,
    }
}
