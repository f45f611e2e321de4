//! EventSubscriber port - Interface for receiving lifecycle events.
//!
//! Handlers register for one [`EventStream`] and receive raw envelopes
//! without knowing about the underlying transport.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::metrics::{EventStream, MetricsError, RawMetricEvent};

/// Handler for processing raw lifecycle events.
///
/// An error is returned to the transport, which decides whether to log,
/// retry or drop. Handlers must leave stored state untouched on error.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: RawMetricEvent) -> Result<(), MetricsError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to event streams.
///
/// # Example
///
/// ```ignore
/// subscriber.subscribe(EventStream::Goals, goal_listener);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to every event delivered on `stream`.
    fn subscribe(&self, stream: EventStream, handler: Arc<dyn EventHandler>);
}
