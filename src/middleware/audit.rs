//! Structured audit trail for security-relevant requests.
//!
//! Mutating requests, authentication attempts, and anything that failed are
//! logged under the `audit` target with the caller identity when the bearer
//! gate established one. Health probes stay out of the trail.

use std::time::Instant;

use axum::{
    extract::Request,
    http::{header::USER_AGENT, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{error, info, warn};

use super::auth_gate::AuthUser;

const AUTH_PATHS: [&str; 3] = [
    "/api/v1/auth/register",
    "/api/v1/auth/login",
    "/api/v1/auth/refresh",
];

fn should_audit(method: &Method, path: &str, status: StatusCode) -> bool {
    if path == "/health" {
        return false;
    }
    matches!(*method, Method::POST | Method::PUT | Method::DELETE)
        || status.is_client_error()
        || status.is_server_error()
        || AUTH_PATHS.contains(&path)
}

pub async fn trail(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let ip = super::client_ip(&request);
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    let started = Instant::now();
    let response = next.run(request).await;
    let status = response.status();

    if should_audit(&method, &path, status) {
        let latency_ms = started.elapsed().as_millis();
        let user = response.extensions().get::<AuthUser>();
        let user_id = user.map(|user| tracing::field::display(user.id));
        let email = user.map(|user| tracing::field::display(&user.email));

        if status.is_server_error() {
            error!(
                target: "audit",
                request_id = %request_id,
                method = %method,
                path = %path,
                status = status.as_u16(),
                latency_ms = %latency_ms,
                ip = %ip,
                user_agent = %user_agent,
                user_id,
                email,
                "request failed"
            );
        } else if status.is_client_error() {
            warn!(
                target: "audit",
                request_id = %request_id,
                method = %method,
                path = %path,
                status = status.as_u16(),
                latency_ms = %latency_ms,
                ip = %ip,
                user_agent = %user_agent,
                user_id,
                email,
                "request rejected"
            );
        } else {
            info!(
                target: "audit",
                request_id = %request_id,
                method = %method,
                path = %path,
                status = status.as_u16(),
                latency_ms = %latency_ms,
                ip = %ip,
                user_agent = %user_agent,
                user_id,
                email,
                "request completed"
            );
        }
    }

    response
}
