//! Request pipeline pieces applied around the router.

pub mod audit;
pub mod auth_gate;
pub mod metrics;
pub mod rate_limit;
pub mod recovery;
pub mod security_headers;

use axum::extract::{ConnectInfo, Request};
use std::net::SocketAddr;

/// Best-effort client address: first hop of `x-forwarded-for` when a proxy
/// set it, otherwise the socket peer.
pub(crate) fn client_ip(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string())
}
