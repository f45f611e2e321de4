//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod metrics;

pub use metrics::{
    ApplyMetricEventCommand, ApplyMetricEventHandler, ApplyMetricEventResult, GetMetricsHandler, GetMetricsQuery,
    GetMetricsResult, InitMetricsCommand, InitMetricsHandler, InitMetricsResult, MetricEventListener,
};
