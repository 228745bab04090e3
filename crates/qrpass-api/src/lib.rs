//! # qrpass-api — Axum API Service for QR Trip Passes
//!
//! Providers reserve a bearer token, register trips to obtain signed QR
//! passes, and scan passes at pickup. Every scan that resolves to a stored
//! trip is appended to the scan history.
//!
//! ## API Surface
//!
//! | Route                   | Module                 | Auth           |
//! |-------------------------|------------------------|----------------|
//! | `POST /api/reserve`     | [`routes::reserve`]    | none           |
//! | `POST /api/qr/generate` | [`routes::qr`]         | provider token |
//! | `POST /api/qr/scan`     | [`routes::qr`]         | provider token |
//! | `GET /api/history`      | [`routes::history`]    | provider token |
//! | `GET /openapi.json`     | [`openapi`]            | provider token |
//! | `GET /health/*`         | probes                 | none           |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod orchestration;
pub mod render;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and the reservation endpoint are mounted
/// outside the auth middleware.
pub fn app(state: AppState) -> Router {
    app_with_metrics(state, ApiMetrics::new())
}

/// As [`app`], recording into the given metrics handle.
pub fn app_with_metrics(state: AppState, metrics: ApiMetrics) -> Router {
    let auth_config = AuthConfig {
        codec: state.codec().clone(),
    };

    // Authenticated API routes.
    let authenticated = Router::new()
        .merge(routes::qr::router())
        .merge(routes::history::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(axum::Extension(auth_config));

    let api = Router::new()
        .merge(routes::reserve::router())
        .merge(authenticated)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(metrics))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
