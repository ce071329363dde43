//! Per-client token-bucket rate limiting.
//!
//! Each client IP owns a bucket refilled at `rate` tokens per second up to
//! `burst`. A background sweeper drops buckets idle for five minutes so the
//! visitor map does not grow without bound.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::api::response;

const SWEEP_INTERVAL: Duration = Duration::from_secs(300);
const IDLE_EVICTION: Duration = Duration::from_secs(300);

struct Visitor {
    tokens: f64,
    last_refill: Instant,
    last_seen: Instant,
}

pub struct RateLimiter {
    visitors: Mutex<HashMap<String, Visitor>>,
    rate: f64,
    burst: f64,
}

impl RateLimiter {
    #[must_use]
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self {
            visitors: Mutex::new(HashMap::new()),
            rate: f64::from(rate_per_sec),
            burst: f64::from(burst),
        }
    }

    /// Take one token for `ip`, returning whether the request may proceed.
    pub fn allow(&self, ip: &str) -> bool {
        self.allow_at(ip, Instant::now())
    }

    fn allow_at(&self, ip: &str, now: Instant) -> bool {
        let mut visitors = self
            .visitors
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let visitor = visitors.entry(ip.to_string()).or_insert(Visitor {
            tokens: self.burst,
            last_refill: now,
            last_seen: now,
        });

        let elapsed = now.saturating_duration_since(visitor.last_refill);
        visitor.tokens = (visitor.tokens + elapsed.as_secs_f64() * self.rate).min(self.burst);
        visitor.last_refill = now;
        visitor.last_seen = now;

        if visitor.tokens >= 1.0 {
            visitor.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn evict_idle(&self, now: Instant) {
        let mut visitors = self
            .visitors
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        visitors.retain(|_, visitor| now.saturating_duration_since(visitor.last_seen) < IDLE_EVICTION);
    }

    /// Spawn the periodic eviction task for the lifetime of the process.
    pub fn spawn_sweeper(limiter: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                limiter.evict_idle(Instant::now());
            }
        });
    }
}

pub async fn limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = super::client_ip(&request);
    if limiter.allow(&ip) {
        next.run(request).await
    } else {
        debug!(ip = %ip, "rate limit exceeded");
        response::failure(
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded. Please try again later.",
            "too_many_requests",
        )
    }
}
