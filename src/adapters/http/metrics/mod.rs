//! Metrics HTTP adapter module.
//!
//! Provides REST API endpoints for reading and initializing metrics.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::ErrorResponse;
pub use handlers::{AuthenticatedUser, MetricsApiError, MetricsAppState};
pub use routes::metrics_routes;
