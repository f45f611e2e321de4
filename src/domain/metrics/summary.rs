//! Month-bucketed planning and completion tallies.
//!
//! Every date is folded onto a canonical anchor (day 2 of its month) and the
//! index holds at most one [`MonthlySummary`] per anchor. Updates never
//! modify an index in place; [`MonthlySummaryIndex::upsert`] returns a new
//! index with the touched bucket replaced.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Day of month used as the canonical bucket key. Day 1 is avoided so that
/// timezone shifts around midnight never move a key into the previous month.
pub const ANCHOR_DAY: u32 = 2;

/// Canonical bucket key for the month containing `date`.
pub fn month_anchor(date: NaiveDate) -> NaiveDate {
    date.with_day(ANCHOR_DAY).unwrap_or(date)
}

/// One calendar month of activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// Anchor date of the month.
    pub month: NaiveDate,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub goals_planned: i64,
    #[serde(default)]
    pub goals_accomplished: i64,
    #[serde(default)]
    pub tasks_planned: i64,
    #[serde(default)]
    pub tasks_completed: i64,
}

impl MonthlySummary {
    /// Zero-valued bucket for the month containing `date`.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            month: month_anchor(date),
            score: 0,
            goals_planned: 0,
            goals_accomplished: 0,
            tasks_planned: 0,
            tasks_completed: 0,
        }
    }

    /// True when anything was planned in this month.
    pub fn has_planned_work(&self) -> bool {
        self.goals_planned > 0 || self.tasks_planned > 0
    }

    fn absorb(&mut self, other: &MonthlySummary) {
        self.score += other.score;
        self.goals_planned += other.goals_planned;
        self.goals_accomplished += other.goals_accomplished;
        self.tasks_planned += other.tasks_planned;
        self.tasks_completed += other.tasks_completed;
    }
}

/// A single field mutation applied to one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMutation {
    GoalPlanned,
    GoalAccomplished { score: i64 },
    /// `delta` is the signed score change (negative for a penalty).
    GoalDeferred { delta: i64 },
    GoalResumed { delta: i64 },
    TaskPlanned,
    TaskCompleted,
}

impl SummaryMutation {
    /// Whether this mutation changes a bucket's score, which in turn
    /// requires the aggregate's average to be recomputed.
    pub fn changes_score(&self) -> bool {
        matches!(
            self,
            SummaryMutation::GoalAccomplished { .. }
                | SummaryMutation::GoalDeferred { .. }
                | SummaryMutation::GoalResumed { .. }
        )
    }

    fn apply_to(self, summary: &mut MonthlySummary) {
        match self {
            SummaryMutation::GoalPlanned => summary.goals_planned += 1,
            SummaryMutation::GoalAccomplished { score } => {
                summary.goals_accomplished += 1;
                summary.score += score;
            }
            SummaryMutation::GoalDeferred { delta } => {
                summary.goals_planned -= 1;
                summary.score += delta;
            }
            SummaryMutation::GoalResumed { delta } => {
                summary.goals_planned += 1;
                summary.score += delta;
            }
            SummaryMutation::TaskPlanned => summary.tasks_planned += 1,
            SummaryMutation::TaskCompleted => summary.tasks_completed += 1,
        }
    }
}

/// Set of monthly buckets keyed by anchor date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<MonthlySummary>", into = "Vec<MonthlySummary>")]
pub struct MonthlySummaryIndex {
    summaries: Vec<MonthlySummary>,
}

impl MonthlySummaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from raw buckets, normalizing anchors and folding any
    /// buckets that share a month into one.
    pub fn from_summaries(summaries: impl IntoIterator<Item = MonthlySummary>) -> Self {
        let mut merged: Vec<MonthlySummary> = Vec::new();
        for mut summary in summaries {
            summary.month = month_anchor(summary.month);
            match merged.iter_mut().find(|s| s.month == summary.month) {
                Some(existing) => existing.absorb(&summary),
                None => merged.push(summary),
            }
        }
        Self { summaries: merged }
    }

    /// Returns a new index where the bucket for `date`'s month has been
    /// created if needed and mutated. All other buckets are untouched.
    pub fn upsert(&self, date: NaiveDate, mutation: SummaryMutation) -> Self {
        let anchor = month_anchor(date);
        let mut summaries = self.summaries.clone();

        match summaries.iter_mut().find(|s| s.month == anchor) {
            Some(existing) => mutation.apply_to(existing),
            None => {
                let mut created = MonthlySummary::empty(anchor);
                mutation.apply_to(&mut created);
                summaries.push(created);
            }
        }

        Self { summaries }
    }

    /// Bucket for the month containing `date`, if one exists.
    pub fn get(&self, date: NaiveDate) -> Option<&MonthlySummary> {
        let anchor = month_anchor(date);
        self.summaries.iter().find(|s| s.month == anchor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonthlySummary> {
        self.summaries.iter()
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Mean bucket score using truncating integer division, reported with at
    /// most two decimals. An empty index averages to zero.
    pub fn average_score(&self) -> f64 {
        if self.summaries.is_empty() {
            return 0.0;
        }
        let total: i64 = self.summaries.iter().map(|s| s.score).sum();
        let mean = total / self.summaries.len() as i64;
        round_two_decimals(mean as f64)
    }
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<Vec<MonthlySummary>> for MonthlySummaryIndex {
    fn from(summaries: Vec<MonthlySummary>) -> Self {
        Self::from_summaries(summaries)
    }
}

impl From<MonthlySummaryIndex> for Vec<MonthlySummary> {
    fn from(index: MonthlySummaryIndex) -> Self {
        index.summaries
    }
}
