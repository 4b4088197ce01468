//! User directory domain service.
//!
//! Implements the [`UserDirectory`] driving port on top of a
//! [`UserRepository`]. The service owns id assignment and timestamps; the
//! repository only stores documents.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{debug, error, info};

use crate::domain::ports::{UserDirectory, UserPersistenceError, UserRepository};
use crate::domain::{Error, TraceId, User, UserDetails, UserId};

/// User directory service implementing the driving port.
#[derive(Clone)]
pub struct UserDirectoryService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> UserDirectoryService<R> {
    /// Create a new service over `repository`.
    ///
    /// # Examples
    /// ```
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// use apid::domain::UserDirectoryService;
    /// use apid::outbound::memory::InMemoryUserRepository;
    ///
    /// let service = UserDirectoryService::new(
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}

impl<R> UserDirectoryService<R>
where
    R: UserRepository,
{
    /// Current instant at the microsecond precision the stores keep.
    fn now(&self) -> DateTime<Utc> {
        self.clock.utc().trunc_subsecs(6)
    }

    fn map_persistence_error(trace_id: &TraceId, error: UserPersistenceError) -> Error {
        error!(%trace_id, %error, "user repository operation failed");
        match error {
            UserPersistenceError::Connection { message } => {
                Error::internal(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
        }
    }

    fn user_not_found(id: &UserId) -> Error {
        Error::not_found(format!("user {id} not found")).with_details(json!({
            "userId": id.to_string(),
        }))
    }

    async fn fetch(&self, trace_id: &TraceId, id: &UserId) -> Result<User, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|err| Self::map_persistence_error(trace_id, err))?
            .ok_or_else(|| Self::user_not_found(id))
    }
}

#[async_trait]
impl<R> UserDirectory for UserDirectoryService<R>
where
    R: UserRepository,
{
    async fn list(&self, trace_id: &TraceId) -> Result<Vec<User>, Error> {
        let users = self
            .repository
            .list()
            .await
            .map_err(|err| Self::map_persistence_error(trace_id, err))?;
        debug!(%trace_id, count = users.len(), "listed users");
        Ok(users)
    }

    async fn retrieve(&self, trace_id: &TraceId, id: &UserId) -> Result<User, Error> {
        let user = self.fetch(trace_id, id).await?;
        debug!(%trace_id, user_id = %id, "retrieved user");
        Ok(user)
    }

    async fn create(&self, trace_id: &TraceId, details: UserDetails) -> Result<User, Error> {
        let user = User::register(UserId::random(), details, self.now());
        self.repository
            .insert(&user)
            .await
            .map_err(|err| Self::map_persistence_error(trace_id, err))?;
        info!(%trace_id, user_id = %user.id(), "created user");
        Ok(user)
    }

    async fn update(
        &self,
        trace_id: &TraceId,
        id: &UserId,
        details: UserDetails,
    ) -> Result<User, Error> {
        let current = self.fetch(trace_id, id).await?;
        let revised = current.revise(details, self.now());
        let replaced = self
            .repository
            .replace(&revised)
            .await
            .map_err(|err| Self::map_persistence_error(trace_id, err))?;
        if !replaced {
            // Removed between the read and the write.
            return Err(Self::user_not_found(id));
        }
        info!(%trace_id, user_id = %id, "updated user");
        Ok(revised)
    }

    async fn delete(&self, trace_id: &TraceId, id: &UserId) -> Result<User, Error> {
        let current = self.fetch(trace_id, id).await?;
        let removed = self
            .repository
            .delete(id)
            .await
            .map_err(|err| Self::map_persistence_error(trace_id, err))?;
        if !removed {
            return Err(Self::user_not_found(id));
        }
        info!(%trace_id, user_id = %id, "deleted user");
        Ok(current)
    }
}

#[cfg(test)]
#[path = "user_directory_tests.rs"]
mod tests;
