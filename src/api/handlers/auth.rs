//! Register, login, and refresh endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};
use regex::Regex;
use serde::Deserialize;
use tracing::error;

use crate::api::{response, AppState};
use crate::auth::{AuthError, Registration};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

fn valid_email(email: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .is_ok_and(|re| re.is_match(email))
}

fn valid_username(username: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9_]{3,30}$").is_ok_and(|re| re.is_match(username))
}

/// At least 8 characters with upper, lower, digit, and special classes.
fn valid_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_ascii_alphanumeric())
}

fn validate_registration(request: &RegisterRequest) -> Option<&'static str> {
    if !valid_email(&request.email) {
        return Some("invalid email address");
    }
    if !valid_username(&request.username) {
        return Some("username must be 3-30 characters of letters, digits, or underscore");
    }
    if !valid_password(&request.password) {
        return Some(
            "password must be at least 8 characters with upper, lower, digit, and special characters",
        );
    }
    None
}

fn bad_request(detail: &str) -> Response {
    response::failure(StatusCode::BAD_REQUEST, "Invalid request data", detail)
}

fn auth_failure(message: &str, err: &AuthError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        error!(error = %err, "authentication flow failed");
        return response::failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            "An unexpected error occurred",
        );
    }
    response::failure(status, message, &err.to_string())
}

pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return bad_request("malformed JSON body");
    };
    if let Some(reason) = validate_registration(&request) {
        return bad_request(reason);
    }

    let registration = Registration {
        email: request.email,
        username: request.username,
        password: request.password,
        first_name: request.first_name,
        last_name: request.last_name,
    };
    match state.auth.register(registration).await {
        Ok(tokens) => response::success(
            StatusCode::CREATED,
            "User registered successfully",
            tokens,
        ),
        Err(err @ AuthError::DuplicateUser) => auth_failure("User already exists", &err),
        Err(err) => auth_failure("Registration failed", &err),
    }
}

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return bad_request("malformed JSON body");
    };
    if request.email.is_empty() || request.password.is_empty() {
        return bad_request("email and password are required");
    }

    match state.auth.login(&request.email, &request.password).await {
        Ok(tokens) => response::success(StatusCode::OK, "Login successful", tokens),
        Err(err) => auth_failure("Authentication failed", &err),
    }
}

pub async fn refresh(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return bad_request("malformed JSON body");
    };
    if request.refresh_token.is_empty() {
        return bad_request("refresh_token is required");
    }

    match state.auth.refresh(&request.refresh_token).await {
        Ok(tokens) => response::success(StatusCode::OK, "Token refreshed successfully", tokens),
        Err(err) => auth_failure("Token refresh failed", &err),
    }
}
