use axum::http::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

/// Failure reasons for the auth flows.
///
/// Login deliberately reports the same [`AuthError::InvalidCredentials`] for
/// an unknown email and a wrong password so callers cannot enumerate
/// accounts.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user with this email or username already exists")]
    DuplicateUser,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user account is inactive")]
    AccountInactive,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("user not found")]
    UserNotFound,
    #[error("failed to hash password: {0}")]
    Hashing(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("storage failure")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// HTTP status this failure maps to at the handler boundary.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::DuplicateUser => StatusCode::CONFLICT,
            Self::InvalidCredentials
            | Self::AccountInactive
            | Self::InvalidToken
            | Self::UserNotFound => StatusCode::UNAUTHORIZED,
            Self::Hashing(_) | Self::MalformedHash(_) | Self::Signing(_) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_email_and_wrong_password_share_a_message() {
        // Both paths surface InvalidCredentials; one Display string serves both.
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "invalid email or password"
        );
    }

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(AuthError::DuplicateUser.status(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::AccountInactive.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::UserNotFound.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::Hashing("entropy".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::Store(StoreError::NotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
