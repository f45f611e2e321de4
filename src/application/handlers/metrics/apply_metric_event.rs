//! ApplyMetricEventHandler - Command handler folding one event into a user's
//! aggregate.
//!
//! Each call is a single load → transition → persist unit. Nothing is
//! written unless the transition succeeds, so a failure leaves the stored
//! aggregate as it was.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::store_timeout::{bounded, DEFAULT_STORE_TIMEOUT};
use crate::domain::metrics::{MetricAggregate, MetricEvent, MetricsError, ScoreCalculator};
use crate::ports::{Clock, MetricRepository};

/// Command to apply a decoded event.
#[derive(Debug, Clone)]
pub struct ApplyMetricEventCommand {
    pub event: MetricEvent,
}

/// Result of a successful apply: the aggregate as stored.
pub type ApplyMetricEventResult = MetricAggregate;

/// Handler for applying lifecycle events to metric aggregates.
///
/// Concurrent events for the same user are not serialized here; the
/// transport must deliver at most one in-flight event per user.
pub struct ApplyMetricEventHandler {
    repository: Arc<dyn MetricRepository>,
    calculator: ScoreCalculator,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl ApplyMetricEventHandler {
    pub fn new(repository: Arc<dyn MetricRepository>, calculator: ScoreCalculator, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            calculator,
            clock,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub async fn handle(&self, cmd: ApplyMetricEventCommand) -> Result<ApplyMetricEventResult, MetricsError> {
        let event = cmd.event;
        let user_id = event.user_id().clone();
        let today = self.clock.today();

        // USER_ADDED replaces whatever is stored, so there is nothing to load.
        let current = match event {
            MetricEvent::UserAdded { .. } => None,
            _ => bounded(self.store_timeout, self.repository.find_by_user_id(&user_id)).await?,
        };

        let next = MetricAggregate::transition(current.as_ref(), &event, &self.calculator, today).map_err(|e| {
            warn!(user_id = %user_id, event_type = %event.event_type(), error = %e, "Transition rejected");
            e
        })?;

        let saved = bounded(self.store_timeout, self.repository.save(&next)).await?;

        debug!(
            user_id = %user_id,
            event_type = %event.event_type(),
            goal_score = saved.goal_score,
            buckets = saved.monthly_summaries.len(),
            "Metric aggregate updated"
        );

        Ok(saved)
    }
}
