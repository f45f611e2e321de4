//! In-memory metric repository for testing and development.
//!
//! Not suitable for multi-server deployments: state lives in process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::domain::metrics::{MetricAggregate, MetricsError};
use crate::ports::MetricRepository;

/// Aggregates keyed by user id, with switchable failure injection.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMetricRepository {
    aggregates: Arc<RwLock<HashMap<String, MetricAggregate>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryMetricRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `find_by_user_id` calls fail with a store error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `save` calls fail with a store error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.aggregates.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.aggregates.read().await.is_empty()
    }
}

#[async_trait]
impl MetricRepository for InMemoryMetricRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<MetricAggregate>, MetricsError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(MetricsError::store("in-memory read failure"));
        }
        Ok(self.aggregates.read().await.get(user_id.as_str()).cloned())
    }

    async fn save(&self, aggregate: &MetricAggregate) -> Result<MetricAggregate, MetricsError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MetricsError::store("in-memory write failure"));
        }
        self.aggregates
            .write()
            .await
            .insert(aggregate.user_id.as_str().to_string(), aggregate.clone());
        Ok(aggregate.clone())
    }
}
