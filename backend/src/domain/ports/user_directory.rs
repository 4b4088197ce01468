//! Driving port for the user CRUD use-cases.
//!
//! Inbound adapters validate payloads into [`UserDetails`] before calling this
//! port, so an invalid user never reaches a repository. Every call carries the
//! request's [`TraceId`] so log lines emitted below the adapter can be
//! correlated with the response.

use async_trait::async_trait;

use crate::domain::{Error, TraceId, User, UserDetails, UserId};

/// Use-case port for managing users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Every user, oldest first.
    async fn list(&self, trace_id: &TraceId) -> Result<Vec<User>, Error>;

    /// A single user, or [`crate::domain::ErrorCode::NotFound`].
    async fn retrieve(&self, trace_id: &TraceId, id: &UserId) -> Result<User, Error>;

    /// Store a new user with server-assigned id and timestamps.
    async fn create(&self, trace_id: &TraceId, details: UserDetails) -> Result<User, Error>;

    /// Replace the mutable fields of an existing user.
    async fn update(
        &self,
        trace_id: &TraceId,
        id: &UserId,
        details: UserDetails,
    ) -> Result<User, Error>;

    /// Remove an existing user, returning the record as it was.
    async fn delete(&self, trace_id: &TraceId, id: &UserId) -> Result<User, Error>;
}
