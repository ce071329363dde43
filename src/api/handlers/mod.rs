//! HTTP handlers.

pub mod auth;
pub mod users;

use axum::http::header::HeaderName;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::GIT_COMMIT_HASH;

/// Liveness probe, also surfaces the running build.
pub async fn health() -> impl IntoResponse {
    let json = json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "build": GIT_COMMIT_HASH,
        "time": Utc::now().to_rfc3339(),
    });

    (
        StatusCode::OK,
        [(
            HeaderName::from_static("x-app"),
            format!(
                "{}:{}:{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                GIT_COMMIT_HASH
            ),
        )],
        Json(json),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn health_reports_ok_and_the_build() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-app"));
    }
}
