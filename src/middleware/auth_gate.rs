//! Bearer-token gate for protected routes.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::{response, AppState};

/// Identity of the verified caller, available to handlers via
/// request extensions and to the audit layer via response extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(request.headers()) else {
        return response::failure(
            StatusCode::UNAUTHORIZED,
            "Authorization header required",
            "missing_token",
        );
    };

    let claims = match state.tokens.validate(token) {
        Ok(claims) => claims,
        Err(_) => {
            return response::failure(
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token",
                "invalid_token",
            );
        }
    };

    let auth_user = AuthUser {
        id: claims.user_id,
        email: claims.email,
    };
    request.extensions_mut().insert(auth_user.clone());

    let mut response = next.run(request).await;
    // Re-expose the identity so the outer audit layer can log it.
    response.extensions_mut().insert(auth_user);
    response
}
