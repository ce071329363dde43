//! User record storage behind a narrow async interface.
//!
//! The rest of the crate only sees the [`UserStore`] trait; the Postgres
//! implementation lives in [`postgres`] and an in-memory one (used by tests
//! and local development) in [`memory`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// A stored user account.
///
/// `password_hash` is never serialized into API responses; it only travels
/// between the store and the credential verifier.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), StoreError>;
    async fn get_by_id(&self, id: Uuid) -> Result<User, StoreError>;
    async fn get_by_email(&self, email: &str) -> Result<User, StoreError>;
    async fn get_by_username(&self, username: &str) -> Result<User, StoreError>;
    async fn update(&self, user: &User) -> Result<(), StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
    /// Returns one page of users plus the total record count.
    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), StoreError>;
    async fn exists_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            username: "a".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$hash".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            avatar: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = sample_user();
        let value = serde_json::to_value(&user).expect("user serializes");
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["email"], "a@x.com");
    }

    #[test]
    fn user_deserializes_without_password_hash() {
        let user = sample_user();
        let raw = serde_json::to_string(&user).expect("user serializes");
        let parsed: User = serde_json::from_str(&raw).expect("user deserializes");
        assert_eq!(parsed.id, user.id);
        assert!(parsed.password_hash.is_empty());
    }
}
