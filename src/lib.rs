//! # Gatehouse (User Management & Authentication API)
//!
//! `gatehouse` is a user management service with token-based authentication.
//! It exposes a versioned REST API for registration, login, token refresh,
//! profile management, and administrative user CRUD.
//!
//! ## Authentication
//!
//! Clients authenticate with short-lived signed access tokens and rotate
//! sessions with longer-lived refresh tokens. Unknown emails and wrong
//! passwords fail with the same error to prevent account enumeration.
//!
//! ## Request pipeline
//!
//! Every request passes through request-id stamping, metrics, security
//! headers, per-IP rate limiting, CORS, tracing, an audit trail, and panic
//! recovery before reaching a handler. Protected routes additionally
//! require a valid bearer token.

pub mod api;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod middleware;
pub mod store;
pub mod users;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
