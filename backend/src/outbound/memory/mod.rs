//! In-memory user store.
//!
//! Backs the user repository port with a process-local map. The service falls
//! back to it when no database URL is configured, and HTTP tests use it to run
//! without PostgreSQL. Contents are lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserId};

/// Process-local implementation of the `UserRepository` port.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| {
            a.timestamps()
                .created
                .cmp(&b.timestamps().created)
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(users)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().await;
        if users.contains_key(user.id()) {
            return Err(UserPersistenceError::query("user already exists"));
        }
        users.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn replace(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut users = self.users.write().await;
        match users.get_mut(user.id()) {
            Some(stored) => {
                *stored = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        Ok(self.users.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use crate::domain::{AddressDraft, UserDetails, UserDraft};

    #[fixture]
    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    fn user(id: UserId, created: DateTime<Utc>) -> User {
        let details = UserDetails::try_from_draft(UserDraft {
            user_type: Some(1),
            first_name: Some("Ada".to_owned()),
            last_name: Some("Lovelace".to_owned()),
            email: Some("ada@example.com".to_owned()),
            company: None,
            addresses: vec![AddressDraft {
                address_type: Some(1),
                city: Some("London".to_owned()),
                state: Some("LDN".to_owned()),
                zipcode: Some("W1 1AA".to_owned()),
                ..AddressDraft::default()
            }],
        })
        .expect("valid details");
        User::register(id, details, created)
    }

    fn fixed_id(last: u8) -> UserId {
        let mut bytes = [0_u8; 16];
        bytes[15] = last;
        UserId::from_uuid(Uuid::from_bytes(bytes))
    }

    #[rstest]
    #[tokio::test]
    async fn list_orders_by_creation_then_id(epoch: DateTime<Utc>) {
        let repo = InMemoryUserRepository::new();
        let newest = user(fixed_id(1), epoch + Duration::hours(1));
        let tied_high = user(fixed_id(9), epoch);
        let tied_low = user(fixed_id(2), epoch);
        for candidate in [&newest, &tied_high, &tied_low] {
            repo.insert(candidate).await.expect("insert succeeds");
        }

        let ids: Vec<UserId> = repo
            .list()
            .await
            .expect("list succeeds")
            .iter()
            .map(|u| *u.id())
            .collect();

        assert_eq!(ids, vec![fixed_id(2), fixed_id(9), fixed_id(1)]);
    }

    #[rstest]
    #[tokio::test]
    async fn list_of_empty_store_is_empty() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.list().await.expect("list succeeds").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn insert_rejects_duplicate_ids(epoch: DateTime<Utc>) {
        let repo = InMemoryUserRepository::new();
        let stored = user(UserId::random(), epoch);
        repo.insert(&stored).await.expect("first insert");

        let error = repo.insert(&stored).await.expect_err("duplicate");
        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn replace_and_delete_report_missing_records(epoch: DateTime<Utc>) {
        let repo = InMemoryUserRepository::new();
        let absent = user(UserId::random(), epoch);

        assert!(!repo.replace(&absent).await.expect("replace runs"));
        assert!(!repo.delete(absent.id()).await.expect("delete runs"));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_removes_stored_user(epoch: DateTime<Utc>) {
        let repo = InMemoryUserRepository::new();
        let stored = user(UserId::random(), epoch);
        repo.insert(&stored).await.expect("insert succeeds");

        assert!(repo.delete(stored.id()).await.expect("delete runs"));
        assert_eq!(repo.find_by_id(stored.id()).await.expect("lookup"), None);
    }
}
