//! Process-local request counters.
//!
//! Lock-free atomics, sampled by the tracking middleware. There is no
//! scrape endpoint; counters are read through [`Metrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::Request, extract::State, middleware::Next, response::Response};

#[derive(Debug, Default)]
pub struct Metrics {
    requests_total: AtomicU64,
    errors_total: AtomicU64,
    in_flight: AtomicU64,
    latency_micros_total: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub errors_total: u64,
    pub in_flight: u64,
    pub latency_micros_total: u64,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_started(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_finished(&self, status: u16, latency_micros: u64) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.latency_micros_total
            .fetch_add(latency_micros, Ordering::Relaxed);
        if status >= 400 {
            self.errors_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            errors_total: self.errors_total.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
            latency_micros_total: self.latency_micros_total.load(Ordering::Relaxed),
        }
    }
}

pub async fn track(
    State(metrics): State<Arc<Metrics>>,
    request: Request,
    next: Next,
) -> Response {
    metrics.request_started();
    let started = Instant::now();
    let response = next.run(request).await;
    let latency = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    metrics.request_finished(response.status().as_u16(), latency);
    response
}
