//! One-way password hashing and constant-time verification.
//!
//! Argon2id with the default work factor; every hash carries its own random
//! salt. Neither the password nor the stored hash is ever logged.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::error::AuthError;

/// Hash a password into a PHC-encoded string.
///
/// # Errors
/// Returns [`AuthError::Hashing`] if the hasher or entropy source fails.
pub fn hash(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hashing(err.to_string()))
}

/// Verify a password against a stored PHC-encoded hash.
///
/// Returns `Ok(false)` on a well-formed mismatch.
///
/// # Errors
/// Returns [`AuthError::MalformedHash`] when the stored hash cannot be
/// parsed or verified structurally.
pub fn verify(password: &str, stored: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(stored).map_err(|err| AuthError::MalformedHash(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(AuthError::MalformedHash(err.to_string())),
    }
}
