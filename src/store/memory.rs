//! In-memory [`UserStore`] used by tests and local development.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::{StoreError, User, UserStore};

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<Uuid, User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        self.registry().insert(user.id, user.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        self.registry().get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.registry()
            .values()
            .find(|user| user.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_username(&self, username: &str) -> Result<User, StoreError> {
        self.registry()
            .values()
            .find(|user| user.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.registry();
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.registry().remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), StoreError> {
        let users = self.registry();
        let total = users.len() as i64;
        let mut all: Vec<User> = users.values().cloned().collect();
        // Stable order so pagination is deterministic.
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let page = all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn exists_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<bool, StoreError> {
        Ok(self
            .registry()
            .values()
            .any(|user| user.email == email || user.username == username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn user(email: &str, username: &str, created_offset_secs: i64) -> User {
        let now = Utc::now() + Duration::seconds(created_offset_secs);
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            username: username.to_string(),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            avatar: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn create_and_lookup_roundtrip() {
        let store = MemoryUserStore::new();
        let alice = user("alice@example.com", "alice", 0);
        store.create(&alice).await.expect("create");

        let by_id = store.get_by_id(alice.id).await.expect("by id");
        assert_eq!(by_id.email, "alice@example.com");

        let by_email = store.get_by_email("alice@example.com").await.expect("by email");
        assert_eq!(by_email.id, alice.id);

        let by_username = store.get_by_username("alice").await.expect("by username");
        assert_eq!(by_username.id, alice.id);
    }

    #[tokio::test]
    async fn missing_records_return_not_found() {
        let store = MemoryUserStore::new();
        assert!(matches!(
            store.get_by_id(Uuid::new_v4()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete(Uuid::new_v4()).await,
            Err(StoreError::NotFound)
        ));
        let ghost = user("ghost@example.com", "ghost", 0);
        assert!(matches!(store.update(&ghost).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn list_pages_in_creation_order() {
        let store = MemoryUserStore::new();
        for i in 0..5 {
            store
                .create(&user(&format!("u{i}@example.com"), &format!("u{i}"), i))
                .await
                .expect("create");
        }

        let (page, total) = store.list(2, 2).await.expect("list");
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].username, "u2");
        assert_eq!(page[1].username, "u3");
    }

    #[tokio::test]
    async fn exists_matches_either_field() {
        let store = MemoryUserStore::new();
        store
            .create(&user("alice@example.com", "alice", 0))
            .await
            .expect("create");

        assert!(store
            .exists_by_email_or_username("alice@example.com", "other")
            .await
            .expect("exists"));
        assert!(store
            .exists_by_email_or_username("other@example.com", "alice")
            .await
            .expect("exists"));
        assert!(!store
            .exists_by_email_or_username("other@example.com", "other")
            .await
            .expect("exists"));
    }
}
