//! # Request Metrics
//!
//! Atomic counters for requests, error responses, and 401 rejections.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Shared metrics state.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    pub request_count: Arc<AtomicU64>,
    pub error_count: Arc<AtomicU64>,
    pub unauthorized_count: Arc<AtomicU64>,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Responses with status 401: rejected bearer credentials and rejected
    /// QR tokens.
    pub fn unauthorized(&self) -> u64 {
        self.unauthorized_count.load(Ordering::Relaxed)
    }
}

/// Middleware that increments request and error counters.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.request_count.fetch_add(1, Ordering::Relaxed);
        let status = response.status();
        if status.is_server_error() || status.is_client_error() {
            m.error_count.fetch_add(1, Ordering::Relaxed);
        }
        if status == axum::http::StatusCode::UNAUTHORIZED {
            m.unauthorized_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    response
}
