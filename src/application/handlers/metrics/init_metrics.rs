//! InitMetricsHandler - Command handler creating an empty aggregate on
//! request.
//!
//! The caller may only initialize their own metrics. Initializing a user
//! that already has an aggregate replaces it with an empty one.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::store_timeout::{bounded, DEFAULT_STORE_TIMEOUT};
use crate::domain::foundation::UserId;
use crate::domain::metrics::{MetricAggregate, MetricsError};
use crate::ports::MetricRepository;

/// Command to initialize metrics for `user_id` on behalf of `caller`.
#[derive(Debug, Clone)]
pub struct InitMetricsCommand {
    pub caller: UserId,
    pub user_id: UserId,
}

pub type InitMetricsResult = MetricAggregate;

pub struct InitMetricsHandler {
    repository: Arc<dyn MetricRepository>,
    store_timeout: Duration,
}

impl InitMetricsHandler {
    pub fn new(repository: Arc<dyn MetricRepository>) -> Self {
        Self {
            repository,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub async fn handle(&self, cmd: InitMetricsCommand) -> Result<InitMetricsResult, MetricsError> {
        // Identity check happens before any store access.
        if !cmd.caller.matches_ignore_case(&cmd.user_id) {
            warn!(caller = %cmd.caller, target = %cmd.user_id, "Forbidden metrics initialization");
            return Err(MetricsError::Forbidden {
                caller: cmd.caller,
                target: cmd.user_id,
            });
        }

        let aggregate = MetricAggregate::new(cmd.user_id);
        let saved = bounded(self.store_timeout, self.repository.save(&aggregate)).await?;

        info!(user_id = %saved.user_id, "Metrics initialized");
        Ok(saved)
    }
}
