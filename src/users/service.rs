use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::cache::Cache;
use crate::store::{StoreError, User, UserStore};

/// Cached user records live this long; writes refresh the entry.
const USER_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("storage failure")]
    Store(#[source] StoreError),
}

impl UserError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for UserError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

/// Partial update; `None` and empty strings both mean "leave as is".
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn Cache>,
}

impl UserService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, cache: Arc<dyn Cache>) -> Self {
        Self { store, cache }
    }

    /// Fetch a user, serving from cache when possible.
    ///
    /// # Errors
    /// `NotFound` when no such user exists.
    pub async fn get_user(&self, id: Uuid) -> Result<User, UserError> {
        if let Some(user) = self.cached_user(id).await {
            return Ok(user);
        }
        let user = self.store.get_by_id(id).await?;
        self.cache_user(&user).await;
        Ok(user)
    }

    /// Paginated listing; page and limit are clamped to sane bounds.
    ///
    /// # Errors
    /// Storage failures only.
    pub async fn list_users(
        &self,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<User>, Pagination), UserError> {
        let page = page.max(1);
        let limit = if (1..=MAX_PAGE_SIZE).contains(&limit) {
            limit
        } else {
            DEFAULT_PAGE_SIZE
        };
        let offset = (page - 1) * limit;

        let (users, total) = self.store.list(offset, limit).await?;
        let pagination = Pagination {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        };
        Ok((users, pagination))
    }

    /// Apply the provided fields and refresh the cache entry.
    ///
    /// # Errors
    /// `NotFound` when no such user exists.
    pub async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User, UserError> {
        let mut user = self.store.get_by_id(id).await?;

        apply_field(&mut user.email, update.email);
        apply_field(&mut user.username, update.username);
        apply_field(&mut user.first_name, update.first_name);
        apply_field(&mut user.last_name, update.last_name);
        if let Some(avatar) = update.avatar.filter(|value| !value.is_empty()) {
            user.avatar = Some(avatar);
        }
        user.updated_at = Utc::now();

        self.store.update(&user).await?;
        self.cache_user(&user).await;
        Ok(user)
    }

    /// # Errors
    /// `NotFound` when no such user exists.
    pub async fn delete_user(&self, id: Uuid) -> Result<(), UserError> {
        self.store.get_by_id(id).await?;
        self.store.delete(id).await?;
        self.cache.delete(&[cache_key(id).as_str()]).await;
        Ok(())
    }

    /// # Errors
    /// `NotFound` when the token subject no longer exists.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<User, UserError> {
        self.get_user(user_id).await
    }

    /// # Errors
    /// `NotFound` when the token subject no longer exists.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: UserUpdate,
    ) -> Result<User, UserError> {
        self.update_user(user_id, update).await
    }

    async fn cached_user(&self, id: Uuid) -> Option<User> {
        let raw = self.cache.get(&cache_key(id)).await?;
        serde_json::from_str(&raw).ok()
    }

    async fn cache_user(&self, user: &User) {
        // Cache failures are silent; the store remains the source of truth.
        if let Ok(raw) = serde_json::to_string(user) {
            self.cache.set(&cache_key(user.id), &raw, USER_CACHE_TTL).await;
        }
    }
}

fn cache_key(id: Uuid) -> String {
    format!("user:{id}")
}

fn apply_field(target: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        *target = value;
    }
}
