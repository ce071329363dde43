//! Signed, time-bound token issuance and validation.
//!
//! Access and refresh tokens share one claims shape and one signing key;
//! they differ only in the TTL requested at issuance. Validation accepts
//! HS256 exclusively, which closes the algorithm-substitution hole, and
//! collapses every parse/signature/time-window failure into a single
//! [`AuthError::InvalidToken`] so callers cannot learn which check failed.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::AuthError;

/// Issuer stamped into every token.
pub const ISSUER: &str = "gatehouse";

/// Fixed subject-type claim; tokens authenticate users, nothing else.
pub const SUBJECT_TYPE: &str = "user_auth";

/// Refresh tokens always live for seven days.
pub const REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Claims carried inside a signed token. Immutable once issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub iss: String,
    pub sub: String,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString, access_ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            access_ttl,
        }
    }

    #[must_use]
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Issue a signed token for the given subject, valid from now until
    /// now + `ttl`.
    ///
    /// # Errors
    /// Returns [`AuthError::Signing`] only on key or serialization failures.
    pub fn issue(&self, user_id: Uuid, email: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id,
            email: email.to_string(),
            iat: now,
            nbf: now,
            exp: now + ttl.as_secs() as i64,
            iss: ISSUER.to_string(),
            sub: SUBJECT_TYPE.to_string(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::Signing)
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidToken`] for any parse, signature,
    /// algorithm, or time-window failure.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_nbf = true;
        // No clock slack: a token is valid exactly within [nbf, exp].
        validation.leeway = 0;
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(
            &SecretString::from("test-signing-secret"),
            Duration::from_secs(3600),
        )
    }

    fn expired_claims(user_id: Uuid) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            user_id,
            email: "a@x.com".to_string(),
            iat: now - 7200,
            nbf: now - 7200,
            exp: now - 3600,
            iss: ISSUER.to_string(),
            sub: SUBJECT_TYPE.to_string(),
        }
    }

    #[test]
    fn issued_tokens_validate_and_carry_the_subject() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let token = tokens
            .issue(user_id, "a@x.com", Duration::from_secs(3600))
            .expect("issue");

        let claims = tokens.validate(&token).expect("validate");
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.sub, SUBJECT_TYPE);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.nbf, claims.iat);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let tokens = service();
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &expired_claims(Uuid::new_v4()),
            &EncodingKey::from_secret(b"test-signing-secret"),
        )
        .expect("encode");

        assert!(matches!(
            tokens.validate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn not_yet_valid_tokens_are_rejected() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            iat: now + 3600,
            nbf: now + 3600,
            exp: now + 7200,
            iss: ISSUER.to_string(),
            sub: SUBJECT_TYPE.to_string(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-signing-secret"),
        )
        .expect("encode");

        assert!(matches!(
            tokens.validate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn tokens_signed_with_a_different_secret_are_rejected() {
        let tokens = service();
        let other = TokenService::new(
            &SecretString::from("some-other-secret"),
            Duration::from_secs(3600),
        );
        let token = other
            .issue(Uuid::new_v4(), "a@x.com", Duration::from_secs(3600))
            .expect("issue");

        assert!(matches!(
            tokens.validate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn tampered_signatures_are_rejected() {
        let tokens = service();
        let token = tokens
            .issue(Uuid::new_v4(), "a@x.com", Duration::from_secs(3600))
            .expect("issue");

        // Flip the last signature character.
        let mut tampered = token.clone();
        let last = tampered.pop().expect("non-empty token");
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(matches!(
            tokens.validate(&tampered),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn other_signing_algorithms_are_rejected() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            iat: now,
            nbf: now,
            exp: now + 3600,
            iss: ISSUER.to_string(),
            sub: SUBJECT_TYPE.to_string(),
        };
        // Same secret, different MAC flavor: still not acceptable.
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(b"test-signing-secret"),
        )
        .expect("encode");

        assert!(matches!(
            tokens.validate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = service();
        assert!(matches!(
            tokens.validate("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }
}
