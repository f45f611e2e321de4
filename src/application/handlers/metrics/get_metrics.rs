//! GetMetricsHandler - Query handler returning a user's trend view.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::store_timeout::{bounded, DEFAULT_STORE_TIMEOUT};
use crate::domain::foundation::UserId;
use crate::domain::metrics::{MetricsError, TrendView, TrendViewBuilder};
use crate::ports::{CircuitBreaker, Clock, MetricRepository};

/// Query for the metrics of one user.
#[derive(Debug, Clone)]
pub struct GetMetricsQuery {
    pub user_id: UserId,
}

pub type GetMetricsResult = TrendView;

/// Loads the aggregate and projects it through a [`TrendViewBuilder`].
///
/// Store failures trip the circuit breaker; a missing aggregate does not.
pub struct GetMetricsHandler {
    repository: Arc<dyn MetricRepository>,
    builder: TrendViewBuilder,
    clock: Arc<dyn Clock>,
    circuit_breaker: Arc<dyn CircuitBreaker>,
    store_timeout: Duration,
}

impl GetMetricsHandler {
    pub fn new(
        repository: Arc<dyn MetricRepository>,
        builder: TrendViewBuilder,
        clock: Arc<dyn Clock>,
        circuit_breaker: Arc<dyn CircuitBreaker>,
    ) -> Self {
        Self {
            repository,
            builder,
            clock,
            circuit_breaker,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub async fn handle(&self, query: GetMetricsQuery) -> Result<GetMetricsResult, MetricsError> {
        if !self.circuit_breaker.should_allow() {
            warn!(user_id = %query.user_id, "Metrics read rejected, circuit open");
            return Err(MetricsError::Unavailable);
        }

        let found = bounded(self.store_timeout, self.repository.find_by_user_id(&query.user_id)).await;
        match &found {
            Err(e) if e.is_infrastructure() => self.circuit_breaker.record_failure(),
            _ => self.circuit_breaker.record_success(),
        }

        let aggregate = found?.ok_or_else(|| MetricsError::UserNotFound(query.user_id.clone()))?;
        Ok(self.builder.build(&aggregate, self.clock.today()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::{MetricAggregate, MonthlySummary, MonthlySummaryIndex, FALLBACK_HINT};
    use crate::ports::{CircuitState, FixedClock};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    // ─────────────────────────────────────────────────────────────────────
    // Mock Implementations
    // ─────────────────────────────────────────────────────────────────────

    struct MockMetricRepository {
        aggregate: Option<MetricAggregate>,
        should_fail: bool,
    }

    impl MockMetricRepository {
        fn empty() -> Self {
            Self {
                aggregate: None,
                should_fail: false,
            }
        }

        fn with_aggregate(aggregate: MetricAggregate) -> Self {
            Self {
                aggregate: Some(aggregate),
                should_fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                aggregate: None,
                should_fail: true,
            }
        }
    }

    #[async_trait]
    impl MetricRepository for MockMetricRepository {
        async fn find_by_user_id(&self, _user_id: &UserId) -> Result<Option<MetricAggregate>, MetricsError> {
            if self.should_fail {
                return Err(MetricsError::store("Simulated failure"));
            }
            Ok(self.aggregate.clone())
        }

        async fn save(&self, aggregate: &MetricAggregate) -> Result<MetricAggregate, MetricsError> {
            Ok(aggregate.clone())
        }
    }

    #[derive(Default)]
    struct MockCircuitBreaker {
        open: AtomicBool,
        successes: AtomicU32,
        failures: AtomicU32,
    }

    impl MockCircuitBreaker {
        fn open() -> Self {
            let breaker = Self::default();
            breaker.open.store(true, Ordering::SeqCst);
            breaker
        }
    }

    impl CircuitBreaker for MockCircuitBreaker {
        fn state(&self) -> CircuitState {
            if self.open.load(Ordering::SeqCst) {
                CircuitState::Open
            } else {
                CircuitState::Closed
            }
        }

        fn should_allow(&self) -> bool {
            self.state().allows_requests()
        }

        fn record_success(&self) {
            self.successes.fetch_add(1, Ordering::SeqCst);
        }

        fn record_failure(&self) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }

        fn reset(&self) {
            self.open.store(false, Ordering::SeqCst);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────

    fn alice() -> UserId {
        UserId::new("alice").unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn handler(repo: MockMetricRepository, breaker: Arc<MockCircuitBreaker>) -> GetMetricsHandler {
        GetMetricsHandler::new(
            Arc::new(repo),
            TrendViewBuilder::default(),
            Arc::new(FixedClock(today())),
            breaker,
        )
    }

    fn query() -> GetMetricsQuery {
        GetMetricsQuery { user_id: alice() }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tests
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn returns_view_for_stored_aggregate() {
        let mut aggregate = MetricAggregate::new(alice());
        aggregate.goal_score = 42;
        aggregate.monthly_summaries = MonthlySummaryIndex::from_summaries(vec![MonthlySummary {
            goals_planned: 3,
            score: 42,
            ..MonthlySummary::empty(today())
        }]);
        let breaker = Arc::new(MockCircuitBreaker::default());

        let view = handler(MockMetricRepository::with_aggregate(aggregate), breaker.clone())
            .handle(query())
            .await
            .unwrap();

        assert_eq!(view.goal_score, 42);
        assert_eq!(view.goals_planned, 3);
        assert_eq!(view.trends.len(), 1);
        assert!(view.fallback.is_empty());
        assert_eq!(breaker.successes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn new_user_gets_fallback_hint() {
        let view = handler(
            MockMetricRepository::with_aggregate(MetricAggregate::new(alice())),
            Arc::new(MockCircuitBreaker::default()),
        )
        .handle(query())
        .await
        .unwrap();

        assert_eq!(view.fallback, FALLBACK_HINT);
    }

    #[tokio::test]
    async fn missing_aggregate_is_not_found_and_not_a_failure() {
        let breaker = Arc::new(MockCircuitBreaker::default());
        let err = handler(MockMetricRepository::empty(), breaker.clone())
            .handle(query())
            .await
            .unwrap_err();

        assert_eq!(err, MetricsError::UserNotFound(alice()));
        assert_eq!(breaker.failures.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_failure_is_recorded_on_breaker() {
        let breaker = Arc::new(MockCircuitBreaker::default());
        let err = handler(MockMetricRepository::failing(), breaker.clone())
            .handle(query())
            .await
            .unwrap_err();

        assert!(err.is_infrastructure());
        assert_eq!(breaker.failures.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn open_circuit_short_circuits() {
        let breaker = Arc::new(MockCircuitBreaker::open());
        let err = handler(MockMetricRepository::failing(), breaker.clone())
            .handle(query())
            .await
            .unwrap_err();

        assert_eq!(err, MetricsError::Unavailable);
        assert_eq!(breaker.failures.load(Ordering::SeqCst), 0);
    }
}
