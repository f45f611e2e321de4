//! Metric handlers.
//!
//! The write side folds lifecycle events into per-user aggregates; the read
//! side serves trend views and lets a user initialize their own metrics.

mod apply_metric_event;
mod get_metrics;
mod init_metrics;
mod metric_event_listener;
mod store_timeout;

pub use apply_metric_event::{ApplyMetricEventCommand, ApplyMetricEventHandler, ApplyMetricEventResult};
pub use get_metrics::{GetMetricsHandler, GetMetricsQuery, GetMetricsResult};
pub use init_metrics::{InitMetricsCommand, InitMetricsHandler, InitMetricsResult};
pub use metric_event_listener::MetricEventListener;
pub use store_timeout::DEFAULT_STORE_TIMEOUT;
