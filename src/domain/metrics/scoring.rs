//! Scoring policy - how much each goal transition is worth.
//!
//! All calculations are pure functions of the policy, the goal and the
//! current calendar date. Lateness is measured in whole calendar days.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::goal::{Goal, GoalLevel};

/// Immutable scoring constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePolicy {
    pub easy_goal_score: i64,
    pub moderate_goal_score: i64,
    pub extreme_goal_score: i64,
    pub defer_penalty: i64,
    pub resume_bonus: i64,
}

impl ScorePolicy {
    /// Base completion score for a level, before any lateness adjustment.
    pub fn base_score(&self, level: GoalLevel) -> i64 {
        match level {
            GoalLevel::Easy => self.easy_goal_score,
            GoalLevel::Moderate => self.moderate_goal_score,
            GoalLevel::Extreme => self.extreme_goal_score,
        }
    }
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            easy_goal_score: 10,
            moderate_goal_score: 20,
            extreme_goal_score: 30,
            defer_penalty: 5,
            resume_bonus: 5,
        }
    }
}

/// Whether a goal was finished by its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionTiming {
    OnTime,
    AfterTime,
}

/// Outcome of scoring a goal completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub level: GoalLevel,
    /// Signed score change; may be negative for very late goals.
    pub delta: i64,
    pub timing: CompletionTiming,
}

/// Applies a [`ScorePolicy`] to goal transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreCalculator {
    policy: ScorePolicy,
}

impl ScoreCalculator {
    pub fn new(policy: ScorePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScorePolicy {
        &self.policy
    }

    /// Whole calendar days between `due_date` and `today` when the goal is
    /// overdue, zero otherwise. A goal due today is not late.
    pub fn days_late(due_date: NaiveDate, today: NaiveDate) -> i64 {
        if due_date < today {
            (today - due_date).num_days()
        } else {
            0
        }
    }

    /// Scores a completion: level base minus days late.
    pub fn completion(&self, goal: &Goal, today: NaiveDate) -> Completion {
        let late = Self::days_late(goal.due_date, today);
        let timing = if goal.due_date < today {
            CompletionTiming::AfterTime
        } else {
            CompletionTiming::OnTime
        };

        Completion {
            level: goal.level,
            delta: self.policy.base_score(goal.level) - late,
            timing,
        }
    }

    /// Signed delta for deferring a goal. Always `<= 0` for a non-negative
    /// penalty; overdue goals lose one extra point per day late.
    pub fn deferral(&self, goal: &Goal, today: NaiveDate) -> i64 {
        -(self.policy.defer_penalty + Self::days_late(goal.due_date, today))
    }

    /// Signed delta for resuming a deferred goal. Overdue goals earn one
    /// point less per day late, which can make the delta negative.
    pub fn resumption(&self, goal: &Goal, today: NaiveDate) -> i64 {
        self.policy.resume_bonus - Self::days_late(goal.due_date, today)
    }
}
