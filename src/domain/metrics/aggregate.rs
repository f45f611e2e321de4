//! Per-user metric aggregate and its event-driven transitions.
//!
//! The aggregate is a value: every transition borrows the current state and
//! returns a new one, so a failed persist leaves nothing half-applied.
//!
//! # Transitions
//!
//! ```text
//! absent --USER_ADDED--> active --(goal/task events)--> active
//! ```
//!
//! Goal completions and task completions land in the bucket of the month in
//! which they happen; additions, deferrals and resumptions land in the bucket
//! of the item's due month.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::errors::MetricsError;
use super::events::MetricEvent;
use super::goal::{Goal, GoalLevel, Task};
use super::scoring::{CompletionTiming, ScoreCalculator};
use super::summary::{MonthlySummaryIndex, SummaryMutation};
use crate::domain::foundation::UserId;

/// Rolling scoreboard for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricAggregate {
    pub user_id: UserId,
    pub goal_score: i64,
    pub average_score: f64,
    pub total_goals_completed: i64,
    /// Can go negative when deferrals or completions are replayed.
    pub total_goals_in_progress: i64,
    pub total_goals_deferred: i64,
    pub goals_completed_on_time: i64,
    pub goals_completed_after_time: i64,
    pub easy_goals_completed: i64,
    pub moderate_goals_completed: i64,
    pub extreme_goals_completed: i64,
    #[serde(default)]
    pub monthly_summaries: MonthlySummaryIndex,
}

impl MetricAggregate {
    /// Fresh scoreboard with every counter at zero and no buckets.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            goal_score: 0,
            average_score: 0.0,
            total_goals_completed: 0,
            total_goals_in_progress: 0,
            total_goals_deferred: 0,
            goals_completed_on_time: 0,
            goals_completed_after_time: 0,
            easy_goals_completed: 0,
            moderate_goals_completed: 0,
            extreme_goals_completed: 0,
            monthly_summaries: MonthlySummaryIndex::new(),
        }
    }

    /// Folds `event` into `current`, producing the next aggregate.
    ///
    /// `USER_ADDED` always yields a fresh aggregate; every other event
    /// requires an existing one.
    pub fn transition(
        current: Option<&MetricAggregate>,
        event: &MetricEvent,
        calculator: &ScoreCalculator,
        today: NaiveDate,
    ) -> Result<MetricAggregate, MetricsError> {
        let current = match (event, current) {
            (MetricEvent::UserAdded { user_id }, _) => {
                return Ok(MetricAggregate::new(user_id.clone()));
            }
            (_, Some(current)) => current,
            (_, None) => return Err(MetricsError::UserNotFound(event.user_id().clone())),
        };

        let next = match event {
            MetricEvent::GoalAdded(goal) => current.with_goal_added(goal),
            MetricEvent::GoalCompleted(goal) => current.with_goal_completed(goal, calculator, today),
            MetricEvent::GoalDeferred(goal) => current.with_goal_deferred(goal, calculator, today),
            MetricEvent::GoalResumed(goal) => current.with_goal_resumed(goal, calculator, today),
            MetricEvent::TaskAdded(task) => current.with_task_added(task),
            MetricEvent::TaskCompleted(_) => current.with_task_completed(today),
            MetricEvent::UserAdded { user_id } => MetricAggregate::new(user_id.clone()),
        };
        Ok(next)
    }

    pub fn with_goal_added(&self, goal: &Goal) -> Self {
        let mut next = self.with_summary(goal.due_date, SummaryMutation::GoalPlanned);
        next.total_goals_in_progress += 1;
        next
    }

    pub fn with_goal_completed(&self, goal: &Goal, calculator: &ScoreCalculator, today: NaiveDate) -> Self {
        let completion = calculator.completion(goal, today);
        let mut next = self.with_summary(
            today,
            SummaryMutation::GoalAccomplished {
                score: completion.delta,
            },
        );

        match completion.level {
            GoalLevel::Easy => next.easy_goals_completed += 1,
            GoalLevel::Moderate => next.moderate_goals_completed += 1,
            GoalLevel::Extreme => next.extreme_goals_completed += 1,
        }
        match completion.timing {
            CompletionTiming::OnTime => next.goals_completed_on_time += 1,
            CompletionTiming::AfterTime => next.goals_completed_after_time += 1,
        }
        next.goal_score += completion.delta;
        next.total_goals_completed += 1;
        next.total_goals_in_progress -= 1;
        next
    }

    pub fn with_goal_deferred(&self, goal: &Goal, calculator: &ScoreCalculator, today: NaiveDate) -> Self {
        let delta = calculator.deferral(goal, today);
        let mut next = self.with_summary(goal.due_date, SummaryMutation::GoalDeferred { delta });
        next.goal_score += delta;
        next.total_goals_deferred += 1;
        next.total_goals_in_progress -= 1;
        next
    }

    pub fn with_goal_resumed(&self, goal: &Goal, calculator: &ScoreCalculator, today: NaiveDate) -> Self {
        let delta = calculator.resumption(goal, today);
        let mut next = self.with_summary(goal.due_date, SummaryMutation::GoalResumed { delta });
        next.goal_score += delta;
        next.total_goals_in_progress += 1;
        next.total_goals_deferred -= 1;
        next
    }

    pub fn with_task_added(&self, task: &Task) -> Self {
        self.with_summary(task.due_date, SummaryMutation::TaskPlanned)
    }

    pub fn with_task_completed(&self, today: NaiveDate) -> Self {
        self.with_summary(today, SummaryMutation::TaskCompleted)
    }

    fn with_summary(&self, date: NaiveDate, mutation: SummaryMutation) -> Self {
        let mut next = self.clone();
        next.monthly_summaries = self.monthly_summaries.upsert(date, mutation);
        if mutation.changes_score() {
            next.average_score = next.monthly_summaries.average_score();
        }
        next
    }
}
