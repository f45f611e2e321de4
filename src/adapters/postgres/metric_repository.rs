//! PostgreSQL implementation of MetricRepository.
//!
//! One row per user in the `metrics` table. Monthly buckets live in a JSONB
//! column so a save replaces the whole aggregate in a single statement.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::foundation::UserId;
use crate::domain::metrics::{MetricAggregate, MetricsError, MonthlySummary, MonthlySummaryIndex};
use crate::ports::MetricRepository;

impl From<sqlx::Error> for MetricsError {
    fn from(err: sqlx::Error) -> Self {
        MetricsError::Store(err.to_string())
    }
}

pub struct PostgresMetricRepository {
    pool: PgPool,
}

impl PostgresMetricRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a metric aggregate.
#[derive(Debug, sqlx::FromRow)]
struct MetricRow {
    user_id: String,
    goal_score: i64,
    average_score: f64,
    total_goals_completed: i64,
    total_goals_in_progress: i64,
    total_goals_deferred: i64,
    goals_completed_on_time: i64,
    goals_completed_after_time: i64,
    easy_goals_completed: i64,
    moderate_goals_completed: i64,
    extreme_goals_completed: i64,
    monthly_summaries: Json<Vec<MonthlySummary>>,
}

impl TryFrom<MetricRow> for MetricAggregate {
    type Error = MetricsError;

    fn try_from(row: MetricRow) -> Result<Self, Self::Error> {
        Ok(MetricAggregate {
            user_id: UserId::new(row.user_id)
                .map_err(|e| MetricsError::store(format!("Invalid user_id: {}", e)))?,
            goal_score: row.goal_score,
            average_score: row.average_score,
            total_goals_completed: row.total_goals_completed,
            total_goals_in_progress: row.total_goals_in_progress,
            total_goals_deferred: row.total_goals_deferred,
            goals_completed_on_time: row.goals_completed_on_time,
            goals_completed_after_time: row.goals_completed_after_time,
            easy_goals_completed: row.easy_goals_completed,
            moderate_goals_completed: row.moderate_goals_completed,
            extreme_goals_completed: row.extreme_goals_completed,
            monthly_summaries: MonthlySummaryIndex::from_summaries(row.monthly_summaries.0),
        })
    }
}

#[async_trait]
impl MetricRepository for PostgresMetricRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<MetricAggregate>, MetricsError> {
        let row: Option<MetricRow> = sqlx::query_as(
            r#"
            SELECT user_id, goal_score, average_score, total_goals_completed,
                   total_goals_in_progress, total_goals_deferred, goals_completed_on_time,
                   goals_completed_after_time, easy_goals_completed, moderate_goals_completed,
                   extreme_goals_completed, monthly_summaries
            FROM metrics
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MetricAggregate::try_from).transpose()
    }

    async fn save(&self, aggregate: &MetricAggregate) -> Result<MetricAggregate, MetricsError> {
        let summaries: Vec<MonthlySummary> = aggregate.monthly_summaries.iter().cloned().collect();

        sqlx::query(
            r#"
            INSERT INTO metrics (
                user_id, goal_score, average_score, total_goals_completed,
                total_goals_in_progress, total_goals_deferred, goals_completed_on_time,
                goals_completed_after_time, easy_goals_completed, moderate_goals_completed,
                extreme_goals_completed, monthly_summaries, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                goal_score = EXCLUDED.goal_score,
                average_score = EXCLUDED.average_score,
                total_goals_completed = EXCLUDED.total_goals_completed,
                total_goals_in_progress = EXCLUDED.total_goals_in_progress,
                total_goals_deferred = EXCLUDED.total_goals_deferred,
                goals_completed_on_time = EXCLUDED.goals_completed_on_time,
                goals_completed_after_time = EXCLUDED.goals_completed_after_time,
                easy_goals_completed = EXCLUDED.easy_goals_completed,
                moderate_goals_completed = EXCLUDED.moderate_goals_completed,
                extreme_goals_completed = EXCLUDED.extreme_goals_completed,
                monthly_summaries = EXCLUDED.monthly_summaries,
                updated_at = NOW()
            "#,
        )
        .bind(aggregate.user_id.as_str())
        .bind(aggregate.goal_score)
        .bind(aggregate.average_score)
        .bind(aggregate.total_goals_completed)
        .bind(aggregate.total_goals_in_progress)
        .bind(aggregate.total_goals_deferred)
        .bind(aggregate.goals_completed_on_time)
        .bind(aggregate.goals_completed_after_time)
        .bind(aggregate.easy_goals_completed)
        .bind(aggregate.moderate_goals_completed)
        .bind(aggregate.extreme_goals_completed)
        .bind(Json(summaries))
        .execute(&self.pool)
        .await
        .map_err(|e| MetricsError::store(format!("Failed to save metrics: {}", e)))?;

        Ok(aggregate.clone())
    }
}
