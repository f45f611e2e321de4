//! Integration tests for the event-driven write path.
//!
//! Events are published on the in-memory bus, routed through the stream
//! listeners into the aggregator, and persisted in the in-memory store.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use goal_metrics::adapters::{InMemoryCircuitBreaker, InMemoryEventBus, InMemoryMetricRepository};
use goal_metrics::application::handlers::metrics::{
    ApplyMetricEventHandler, GetMetricsHandler, GetMetricsQuery, MetricEventListener,
};
use goal_metrics::domain::foundation::UserId;
use goal_metrics::domain::metrics::{
    EventStream, MetricsError, RawMetricEvent, ScoreCalculator, TrendViewBuilder, FALLBACK_HINT,
};
use goal_metrics::ports::{CircuitBreakerConfig, Clock, EventSubscriber, FixedClock, MetricRepository};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn alice() -> UserId {
    UserId::new("alice").unwrap()
}

struct Harness {
    bus: InMemoryEventBus,
    repository: InMemoryMetricRepository,
    reader: GetMetricsHandler,
}

impl Harness {
    fn at(today: NaiveDate) -> Self {
        let repository = InMemoryMetricRepository::new();
        let store: Arc<dyn MetricRepository> = Arc::new(repository.clone());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(today));

        let aggregator = Arc::new(ApplyMetricEventHandler::new(
            store.clone(),
            ScoreCalculator::default(),
            clock.clone(),
        ));

        let bus = InMemoryEventBus::new();
        for listener in MetricEventListener::for_all_streams(aggregator) {
            bus.subscribe(listener.stream(), listener);
        }

        let reader = GetMetricsHandler::new(
            store,
            TrendViewBuilder::default(),
            clock,
            Arc::new(InMemoryCircuitBreaker::new("test_store", CircuitBreakerConfig::default())),
        );

        Self { bus, repository, reader }
    }

    async fn user_added(&self, user: &str) -> Result<(), MetricsError> {
        self.bus
            .publish(EventStream::Users, RawMetricEvent::new("USER_ADDED", user, None))
            .await
    }

    async fn goal(&self, event_type: &str, id: &str, level: &str, due: &str) -> Result<(), MetricsError> {
        let data = json!({
            "id": id,
            "userId": "alice",
            "level": level,
            "dueDate": due,
        });
        self.bus
            .publish(EventStream::Goals, RawMetricEvent::new(event_type, id, Some(data)))
            .await
    }

    async fn task(&self, event_type: &str, id: &str, due: &str) -> Result<(), MetricsError> {
        let data = json!({
            "id": id,
            "userId": "alice",
            "dueDate": due,
        });
        self.bus
            .publish(EventStream::Tasks, RawMetricEvent::new(event_type, id, Some(data)))
            .await
    }
}

// =============================================================================
// Write path
// =============================================================================

#[tokio::test]
async fn lifecycle_events_build_up_the_scoreboard() {
    let harness = Harness::at(date(2024, 3, 10));

    harness.user_added("alice").await.unwrap();
    harness.goal("GOAL_ADDED", "g-1", "Easy", "2024-03-07").await.unwrap();
    harness.goal("GOAL_COMPLETED", "g-1", "Easy", "2024-03-07").await.unwrap();
    harness.task("TASK_ADDED", "t-1", "2024-03-20").await.unwrap();
    harness.task("TASK_COMPLETED", "t-1", "2024-03-20").await.unwrap();

    let view = harness.reader.handle(GetMetricsQuery { user_id: alice() }).await.unwrap();

    assert_eq!(view.goal_score, 7);
    assert_eq!(view.average_score, 7.0);
    assert_eq!(view.total_goals_completed, 1);
    assert_eq!(view.total_goals_in_progress, 0);
    assert_eq!(view.goals_completed_after_time, 1);
    assert_eq!(view.easy_goals_completed, 1);
    assert_eq!(
        (view.goals_planned, view.goals_accomplished, view.tasks_planned, view.tasks_completed),
        (1, 1, 1, 1)
    );
    assert_eq!(view.trends.len(), 1);
    assert_eq!(view.trends[0].key, "Mar");
    assert_eq!(view.trends[0].value, 7);
    assert!(view.fallback.is_empty());
}

#[tokio::test]
async fn deferral_and_resumption_adjust_score() {
    let harness = Harness::at(date(2024, 3, 10));

    harness.user_added("alice").await.unwrap();
    harness.goal("GOAL_ADDED", "g-1", "Moderate", "2024-03-20").await.unwrap();
    harness.goal("GOAL_DEFERRED", "g-1", "Moderate", "2024-03-20").await.unwrap();

    let deferred = harness.repository.find_by_user_id(&alice()).await.unwrap().unwrap();
    assert_eq!(deferred.goal_score, -5);
    assert_eq!(deferred.total_goals_deferred, 1);
    assert_eq!(deferred.total_goals_in_progress, 0);

    harness.goal("GOAL_RESUMED", "g-1", "Moderate", "2024-03-20").await.unwrap();

    let resumed = harness.repository.find_by_user_id(&alice()).await.unwrap().unwrap();
    assert_eq!(resumed.goal_score, 0);
    assert_eq!(resumed.total_goals_deferred, 0);
    assert_eq!(resumed.total_goals_in_progress, 1);
}

#[tokio::test]
async fn goal_event_for_unknown_user_is_rejected_without_writing() {
    let harness = Harness::at(date(2024, 3, 10));

    let err = harness
        .goal("GOAL_ADDED", "g-1", "Easy", "2024-03-20")
        .await
        .unwrap_err();

    assert_eq!(err, MetricsError::UserNotFound(alice()));
    assert!(harness.repository.is_empty().await);
}

#[tokio::test]
async fn unrecognized_event_type_leaves_aggregate_unchanged() {
    let harness = Harness::at(date(2024, 3, 10));
    harness.user_added("alice").await.unwrap();
    let before = harness.repository.find_by_user_id(&alice()).await.unwrap();

    let err = harness
        .goal("GOAL_ARCHIVED", "g-1", "Easy", "2024-03-20")
        .await
        .unwrap_err();

    assert!(matches!(err, MetricsError::UnrecognizedEvent { .. }));
    assert_eq!(harness.repository.find_by_user_id(&alice()).await.unwrap(), before);
}

#[tokio::test]
async fn goal_event_without_payload_is_a_data_error() {
    let harness = Harness::at(date(2024, 3, 10));
    harness.user_added("alice").await.unwrap();

    let err = harness
        .bus
        .publish(EventStream::Goals, RawMetricEvent::new("GOAL_ADDED", "g-1", None))
        .await
        .unwrap_err();

    assert!(matches!(err, MetricsError::DataFormat(_)));
}

#[tokio::test]
async fn goal_type_on_task_stream_is_unrecognized() {
    let harness = Harness::at(date(2024, 3, 10));
    harness.user_added("alice").await.unwrap();

    let err = harness.task("GOAL_ADDED", "t-1", "2024-03-20").await.unwrap_err();

    assert_eq!(
        err,
        MetricsError::UnrecognizedEvent {
            stream: "task".to_string(),
            event_type: "GOAL_ADDED".to_string(),
        }
    );
}

#[tokio::test]
async fn repeated_user_added_resets_the_aggregate() {
    let harness = Harness::at(date(2024, 3, 10));
    harness.user_added("alice").await.unwrap();
    harness.goal("GOAL_ADDED", "g-1", "Easy", "2024-03-20").await.unwrap();

    harness.user_added("alice").await.unwrap();

    let view = harness.reader.handle(GetMetricsQuery { user_id: alice() }).await.unwrap();
    assert_eq!(view.total_goals_in_progress, 0);
    assert_eq!(view.fallback, FALLBACK_HINT);
}

#[tokio::test]
async fn failed_write_surfaces_store_error() {
    let harness = Harness::at(date(2024, 3, 10));
    harness.user_added("alice").await.unwrap();
    harness.repository.set_fail_writes(true);

    let err = harness
        .goal("GOAL_ADDED", "g-1", "Easy", "2024-03-20")
        .await
        .unwrap_err();
    assert!(matches!(err, MetricsError::Store(_)));

    harness.repository.set_fail_writes(false);
    let stored = harness.repository.find_by_user_id(&alice()).await.unwrap().unwrap();
    assert_eq!(stored.total_goals_in_progress, 0);
}

#[tokio::test]
async fn every_stream_has_one_listener() {
    let harness = Harness::at(date(2024, 3, 10));
    for stream in EventStream::ALL {
        assert_eq!(harness.bus.handler_count(stream), 1);
    }
}
