//! HTTP adapters - REST API implementations.

pub mod metrics;

pub use metrics::{metrics_routes, MetricsAppState};
