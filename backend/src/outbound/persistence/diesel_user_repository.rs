//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Each user is one row; its addresses live in a JSONB array alongside the
//! scalar columns. Rows are re-validated through the domain on the way out, so
//! a tampered document surfaces as a query error instead of an invalid user.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{AddressDraft, Timestamps, User, UserDetails, UserDraft, UserId};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AddressDocument, NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn address_documents(user: &User) -> Result<serde_json::Value, UserPersistenceError> {
    let documents: Vec<AddressDocument> = user
        .addresses()
        .iter()
        .map(|address| {
            let details = address.details();
            let stamps = address.timestamps();
            AddressDocument {
                address_type: i32::from(details.address_type().get()),
                line_one: details.line_one().map(str::to_owned),
                line_two: details.line_two().map(str::to_owned),
                city: details.city().to_owned(),
                state: details.state().to_owned(),
                zipcode: details.zipcode().to_owned(),
                phone: details.phone().map(str::to_owned),
                date_created: stamps.created,
                date_modified: stamps.modified,
            }
        })
        .collect();
    serde_json::to_value(documents)
        .map_err(|err| UserPersistenceError::query(format!("encode addresses: {err}")))
}

fn new_row(user: &User) -> Result<NewUserRow<'_>, UserPersistenceError> {
    let stamps = user.timestamps();
    Ok(NewUserRow {
        user_id: *user.id().as_uuid(),
        user_type: i32::from(user.user_type().get()),
        first_name: user.first_name().as_ref(),
        last_name: user.last_name().as_ref(),
        email: user.email().as_ref(),
        company: user.company(),
        addresses: address_documents(user)?,
        date_created: stamps.created,
        date_modified: stamps.modified,
    })
}

fn changeset(user: &User) -> Result<UserChangeset<'_>, UserPersistenceError> {
    Ok(UserChangeset {
        user_type: i32::from(user.user_type().get()),
        first_name: user.first_name().as_ref(),
        last_name: user.last_name().as_ref(),
        email: user.email().as_ref(),
        company: user.company(),
        addresses: address_documents(user)?,
        date_modified: user.timestamps().modified,
    })
}

/// Convert a database row back into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let documents: Vec<AddressDocument> =
        serde_json::from_value(row.addresses).map_err(|err| {
            warn!(user_id = %row.user_id, error = %err, "undecodable address document");
            UserPersistenceError::query(format!("decode addresses: {err}"))
        })?;

    let address_timestamps = documents
        .iter()
        .map(|doc| Timestamps {
            created: doc.date_created,
            modified: doc.date_modified,
        })
        .collect();
    let draft = UserDraft {
        user_type: Some(i64::from(row.user_type)),
        first_name: Some(row.first_name),
        last_name: Some(row.last_name),
        email: Some(row.email),
        company: row.company,
        addresses: documents
            .into_iter()
            .map(|doc| AddressDraft {
                address_type: Some(i64::from(doc.address_type)),
                line_one: doc.line_one,
                line_two: doc.line_two,
                city: Some(doc.city),
                state: Some(doc.state),
                zipcode: Some(doc.zipcode),
                phone: doc.phone,
            })
            .collect(),
    };
    let details = UserDetails::try_from_draft(draft).map_err(|err| {
        warn!(user_id = %row.user_id, error = %err, "stored user failed validation");
        UserPersistenceError::query(format!("stored user is invalid: {err}"))
    })?;

    Ok(User::restore(
        UserId::from_uuid(row.user_id),
        details,
        address_timestamps,
        Timestamps {
            created: row.date_created,
            modified: row.date_modified,
        },
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order((users::date_created.asc(), users::user_id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let row = new_row(user)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn replace(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let update = changeset(user)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated_rows = diesel::update(users::table.find(*user.id().as_uuid()))
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated_rows > 0)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted_rows = diesel::delete(users::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted_rows > 0)
    }
}
