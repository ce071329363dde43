//! Register, login, and refresh flows.
//!
//! Each flow talks to the user store, the credential hasher, and the token
//! service; every success ends with a fresh access+refresh pair so clients
//! can run a sliding session. Hashing and verification run on the blocking
//! pool to keep the Argon2 work factor off the async workers.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::task;
use uuid::Uuid;

use super::{error::AuthError, password, token, token::TokenService};
use crate::store::{StoreError, User, UserStore};

/// Input for the register flow. The password is consumed, never stored.
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Response shape shared by all three auth flows.
#[derive(Serialize)]
pub struct AuthTokens {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Register a new account and hand back its first token pair.
    ///
    /// # Errors
    /// `DuplicateUser` when the email or username is taken; hashing, signing,
    /// and storage failures otherwise.
    pub async fn register(&self, registration: Registration) -> Result<AuthTokens, AuthError> {
        // Uniqueness first: no point paying for Argon2 on a duplicate.
        if self
            .store
            .exists_by_email_or_username(&registration.email, &registration.username)
            .await?
        {
            return Err(AuthError::DuplicateUser);
        }

        let password = registration.password;
        let password_hash = task::spawn_blocking(move || password::hash(&password))
            .await
            .map_err(|err| AuthError::Hashing(err.to_string()))??;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: registration.email,
            username: registration.username,
            password_hash,
            first_name: registration.first_name,
            last_name: registration.last_name,
            avatar: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.create(&user).await?;

        self.issue_pair(user)
    }

    /// Verify credentials and issue a token pair.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown email and for a wrong password
    /// alike; `AccountInactive` for disabled accounts.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, AuthError> {
        let user = match self.store.get_by_email(email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(AuthError::InvalidCredentials),
            Err(err) => return Err(err.into()),
        };

        if !user.is_active {
            return Err(AuthError::AccountInactive);
        }

        let stored = user.password_hash.clone();
        let candidate = password.to_string();
        let verified = task::spawn_blocking(move || password::verify(&candidate, &stored))
            .await
            .map_err(|err| AuthError::Hashing(err.to_string()))??;
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_pair(user)
    }

    /// Validate a refresh token and rotate in a new pair.
    ///
    /// The old refresh token is not revoked; it stays valid until its own
    /// expiry (there is no revocation list).
    ///
    /// # Errors
    /// `InvalidToken` on validation failure, `UserNotFound` /
    /// `AccountInactive` on subject lookup.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let claims = self.tokens.validate(refresh_token)?;

        let user = match self.store.get_by_id(claims.user_id).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(AuthError::UserNotFound),
            Err(err) => return Err(err.into()),
        };

        if !user.is_active {
            return Err(AuthError::AccountInactive);
        }

        self.issue_pair(user)
    }

    fn issue_pair(&self, user: User) -> Result<AuthTokens, AuthError> {
        let access_token = self
            .tokens
            .issue(user.id, &user.email, self.tokens.access_ttl())?;
        let refresh_token = self.tokens.issue(user.id, &user.email, token::REFRESH_TTL)?;
        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.tokens.access_ttl().as_secs() as i64,
            user,
        })
    }
}
