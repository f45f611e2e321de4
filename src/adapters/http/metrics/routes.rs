//! HTTP routes for metrics endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{get_metrics, health, init_metrics, MetricsAppState};

/// Creates the metrics router with all routes.
pub fn metrics_routes(state: MetricsAppState) -> Router {
    Router::new()
        // GET /metrics
        .route("/metrics", get(get_metrics))
        // POST /metrics/:user_id
        .route("/metrics/:user_id", post(init_metrics))
        // GET /health
        .route("/health", get(health))
        .with_state(state)
}
