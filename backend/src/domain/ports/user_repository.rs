//! Port abstraction for user persistence adapters and their errors.
//!
//! The store holds whole user documents keyed by [`UserId`]. Adapters report
//! absent records through `Option` and `bool` results; only infrastructure
//! failures surface as [`UserPersistenceError`].

use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Document store for users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every stored user, oldest first with ties broken by id.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Store a new user.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Overwrite the stored document with the same id.
    ///
    /// Returns `false` when no such document exists.
    async fn replace(&self, user: &User) -> Result<bool, UserPersistenceError>;

    /// Remove a user.
    ///
    /// Returns `false` when no such document exists.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}
