//! # HTTP Middleware
//!
//! - `metrics` — in-process request and error counters.
//! - `tracing_layer` — `tower_http` request spans.

pub mod metrics;
pub mod tracing_layer;
