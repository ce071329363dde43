//! Profile and user management endpoints. All of these sit behind the
//! bearer gate.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::api::{response, AppState};
use crate::middleware::auth_gate::AuthUser;
use crate::store::User;
use crate::users::{Pagination, UserError, UserUpdate};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

#[derive(Serialize)]
struct ListResponse {
    users: Vec<User>,
    pagination: Pagination,
}

fn user_failure(message: &str, err: &UserError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        error!(error = %err, "user operation failed");
        return response::failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            "An unexpected error occurred",
        );
    }
    response::failure(status, message, &err.to_string())
}

pub async fn profile(
    Extension(state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Response {
    match state.users.get_profile(auth.id).await {
        Ok(user) => response::success(StatusCode::OK, "Profile retrieved successfully", user),
        Err(err) => user_failure("Profile not found", &err),
    }
}

pub async fn update_profile(
    Extension(state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Response {
    let Ok(Json(update)) = payload else {
        return response::failure(
            StatusCode::BAD_REQUEST,
            "Invalid request data",
            "malformed JSON body",
        );
    };
    match state.users.update_profile(auth.id, update).await {
        Ok(user) => response::success(StatusCode::OK, "Profile updated successfully", user),
        Err(err) => user_failure("Profile not found", &err),
    }
}

pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let Ok(Query(query)) = query else {
        return response::failure(
            StatusCode::BAD_REQUEST,
            "Invalid request data",
            "page and limit must be integers",
        );
    };
    match state.users.list_users(query.page, query.limit).await {
        Ok((users, pagination)) => response::success(
            StatusCode::OK,
            "Users retrieved successfully",
            ListResponse { users, pagination },
        ),
        Err(err) => user_failure("Failed to list users", &err),
    }
}

pub async fn get(
    Extension(state): Extension<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let Ok(Path(id)) = id else {
        return invalid_id();
    };
    match state.users.get_user(id).await {
        Ok(user) => response::success(StatusCode::OK, "User retrieved successfully", user),
        Err(err) => user_failure("User not found", &err),
    }
}

pub async fn update(
    Extension(state): Extension<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Response {
    let Ok(Path(id)) = id else {
        return invalid_id();
    };
    let Ok(Json(update)) = payload else {
        return response::failure(
            StatusCode::BAD_REQUEST,
            "Invalid request data",
            "malformed JSON body",
        );
    };
    match state.users.update_user(id, update).await {
        Ok(user) => response::success(StatusCode::OK, "User updated successfully", user),
        Err(err) => user_failure("User not found", &err),
    }
}

pub async fn delete(
    Extension(state): Extension<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let Ok(Path(id)) = id else {
        return invalid_id();
    };
    match state.users.delete_user(id).await {
        Ok(()) => response::message(StatusCode::OK, "User deleted successfully"),
        Err(err) => user_failure("User not found", &err),
    }
}

fn invalid_id() -> Response {
    response::failure(
        StatusCode::BAD_REQUEST,
        "Invalid request data",
        "user id must be a UUID",
    )
}
