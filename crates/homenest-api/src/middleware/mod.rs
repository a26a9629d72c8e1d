//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - [`tracing_layer`]: request/response tracing with `TraceLayer`.
//! - [`metrics`]: Prometheus-compatible request metrics.
//!
//! The access guard lives in [`crate::auth`].

pub mod metrics;
pub mod tracing_layer;
