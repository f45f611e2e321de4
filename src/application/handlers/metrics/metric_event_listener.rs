//! MetricEventListener - Event handler bound to one lifecycle stream.
//!
//! Decodes raw envelopes arriving on its stream and forwards them to the
//! [`ApplyMetricEventHandler`]. Every failure is returned to the transport.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::apply_metric_event::{ApplyMetricEventCommand, ApplyMetricEventHandler};
use crate::domain::metrics::{EventStream, MetricEvent, MetricsError, RawMetricEvent};
use crate::ports::EventHandler;

pub struct MetricEventListener {
    stream: EventStream,
    aggregator: Arc<ApplyMetricEventHandler>,
}

impl MetricEventListener {
    pub fn new(stream: EventStream, aggregator: Arc<ApplyMetricEventHandler>) -> Self {
        Self { stream, aggregator }
    }

    /// One listener per stream, all sharing `aggregator`.
    pub fn for_all_streams(aggregator: Arc<ApplyMetricEventHandler>) -> Vec<Arc<MetricEventListener>> {
        EventStream::ALL
            .into_iter()
            .map(|stream| Arc::new(Self::new(stream, aggregator.clone())))
            .collect()
    }

    pub fn stream(&self) -> EventStream {
        self.stream
    }
}

#[async_trait]
impl EventHandler for MetricEventListener {
    async fn handle(&self, event: RawMetricEvent) -> Result<(), MetricsError> {
        info!(
            stream = %self.stream,
            event_type = %event.event_type,
            key = %event.key,
            "Processing {} event", self.stream.subject()
        );

        let decoded = MetricEvent::decode(self.stream, &event).map_err(|e| {
            warn!(stream = %self.stream, event_type = %event.event_type, error = %e, "Rejected event");
            e
        })?;
        let user_id = decoded.user_id().clone();

        match self.aggregator.handle(ApplyMetricEventCommand { event: decoded }).await {
            Ok(_) => {
                info!(
                    stream = %self.stream,
                    event_type = %event.event_type,
                    user_id = %user_id,
                    "Processed {} event", self.stream.subject()
                );
                Ok(())
            }
            Err(e) if e.is_infrastructure() => {
                error!(stream = %self.stream, user_id = %user_id, error = %e, "Store failure while applying event");
                Err(e)
            }
            Err(e) => {
                warn!(stream = %self.stream, user_id = %user_id, error = %e, "Event not applied");
                Err(e)
            }
        }
    }

    fn name(&self) -> &'static str {
        match self.stream {
            EventStream::Goals => "GoalMetricListener",
            EventStream::Tasks => "TaskMetricListener",
            EventStream::Users => "UserMetricListener",
        }
    }
}
