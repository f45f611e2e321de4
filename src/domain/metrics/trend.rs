//! Read-side projection of an aggregate into a trailing-window trend.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::aggregate::MetricAggregate;
use super::summary::{month_anchor, MonthlySummary};

/// Hint shown when a user has not planned anything yet.
pub const FALLBACK_HINT: &str = "Please start adding goals and tasks!";

/// Default trailing window, in months.
pub const DEFAULT_WINDOW_MONTHS: u32 = 3;

/// One point on the score trend: abbreviated month name and bucket score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalTrend {
    pub key: String,
    pub value: i64,
}

/// How trend points are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendOrder {
    /// By calendar month number only. A window spanning a year boundary
    /// lists January before November.
    #[default]
    MonthNumber,
    /// By (year, month).
    Chronological,
}

/// Presentation view returned by the query surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendView {
    pub goal_score: i64,
    pub average_score: f64,
    pub total_goals_completed: i64,
    pub total_goals_in_progress: i64,
    pub total_goals_deferred: i64,
    pub goals_completed_on_time: i64,
    pub goals_completed_after_time: i64,
    pub easy_goals_completed: i64,
    pub moderate_goals_completed: i64,
    pub extreme_goals_completed: i64,
    pub goals_planned: i64,
    pub goals_accomplished: i64,
    pub tasks_planned: i64,
    pub tasks_completed: i64,
    pub trends: Vec<GoalTrend>,
    pub active_month: NaiveDate,
    pub fallback: String,
}

/// Builds [`TrendView`]s from stored aggregates.
#[derive(Debug, Clone, Copy)]
pub struct TrendViewBuilder {
    window_months: u32,
    order: TrendOrder,
}

impl Default for TrendViewBuilder {
    fn default() -> Self {
        Self {
            window_months: DEFAULT_WINDOW_MONTHS,
            order: TrendOrder::default(),
        }
    }
}

impl TrendViewBuilder {
    pub fn new(window_months: u32, order: TrendOrder) -> Self {
        Self { window_months, order }
    }

    pub fn window_months(&self) -> u32 {
        self.window_months
    }

    pub fn order(&self) -> TrendOrder {
        self.order
    }

    /// Projects `aggregate` as seen on `today`. Never mutates the aggregate.
    pub fn build(&self, aggregate: &MetricAggregate, today: NaiveDate) -> TrendView {
        let active_month = month_anchor(today);
        let current = aggregate
            .monthly_summaries
            .get(today)
            .cloned()
            .unwrap_or_else(|| MonthlySummary::empty(today));

        let fallback = if aggregate.monthly_summaries.iter().any(MonthlySummary::has_planned_work) {
            String::new()
        } else {
            FALLBACK_HINT.to_string()
        };

        TrendView {
            goal_score: aggregate.goal_score,
            average_score: aggregate.average_score,
            total_goals_completed: aggregate.total_goals_completed,
            total_goals_in_progress: aggregate.total_goals_in_progress,
            total_goals_deferred: aggregate.total_goals_deferred,
            goals_completed_on_time: aggregate.goals_completed_on_time,
            goals_completed_after_time: aggregate.goals_completed_after_time,
            easy_goals_completed: aggregate.easy_goals_completed,
            moderate_goals_completed: aggregate.moderate_goals_completed,
            extreme_goals_completed: aggregate.extreme_goals_completed,
            goals_planned: current.goals_planned,
            goals_accomplished: current.goals_accomplished,
            tasks_planned: current.tasks_planned,
            tasks_completed: current.tasks_completed,
            trends: self.trends(aggregate, today),
            active_month,
            fallback,
        }
    }

    /// Buckets whose anchor falls strictly after `today` minus the window.
    pub fn trends(&self, aggregate: &MetricAggregate, today: NaiveDate) -> Vec<GoalTrend> {
        let cutoff = today.checked_sub_months(Months::new(self.window_months));

        let mut window: Vec<&MonthlySummary> = aggregate
            .monthly_summaries
            .iter()
            .filter(|s| cutoff.map_or(true, |cutoff| cutoff < s.month))
            .collect();

        match self.order {
            TrendOrder::MonthNumber => window.sort_by_key(|s| s.month.month()),
            TrendOrder::Chronological => window.sort_by_key(|s| s.month),
        }

        window
            .into_iter()
            .map(|s| GoalTrend {
                key: s.month.format("%b").to_string(),
                value: s.score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::metrics::summary::MonthlySummaryIndex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bucket(month: NaiveDate, score: i64, goals_planned: i64) -> MonthlySummary {
        MonthlySummary {
            score,
            goals_planned,
            ..MonthlySummary::empty(month)
        }
    }

    fn aggregate_with(buckets: Vec<MonthlySummary>) -> MetricAggregate {
        let mut aggregate = MetricAggregate::new(UserId::new("alice").unwrap());
        aggregate.monthly_summaries = MonthlySummaryIndex::from_summaries(buckets);
        aggregate
    }

    fn keys(view: &TrendView) -> Vec<&str> {
        view.trends.iter().map(|t| t.key.as_str()).collect()
    }

    #[test]
    fn window_keeps_last_three_months() {
        let today = date(2024, 6, 15);
        let aggregate = aggregate_with(vec![
            bucket(date(2024, 6, 2), 6, 1),
            bucket(date(2024, 5, 2), 5, 0),
            bucket(date(2024, 4, 2), 4, 0),
            bucket(date(2024, 2, 2), 2, 0),
        ]);

        let view = TrendViewBuilder::default().build(&aggregate, today);

        assert_eq!(keys(&view), vec!["Apr", "May", "Jun"]);
        assert_eq!(view.trends[2].value, 6);
    }

    #[test]
    fn bucket_exactly_three_months_back_is_kept_early_in_month() {
        let today = date(2024, 6, 1);
        let aggregate = aggregate_with(vec![bucket(date(2024, 3, 2), 3, 1)]);

        let view = TrendViewBuilder::default().build(&aggregate, today);
        assert_eq!(keys(&view), vec!["Mar"]);

        let later = TrendViewBuilder::default().build(&aggregate, date(2024, 6, 2));
        assert!(later.trends.is_empty());
    }

    #[test]
    fn month_number_order_puts_january_first_across_year_boundary() {
        let today = date(2025, 1, 10);
        let aggregate = aggregate_with(vec![
            bucket(date(2024, 11, 2), 11, 1),
            bucket(date(2024, 12, 2), 12, 1),
            bucket(date(2025, 1, 2), 1, 1),
        ]);

        let quirky = TrendViewBuilder::default().build(&aggregate, today);
        assert_eq!(keys(&quirky), vec!["Jan", "Nov", "Dec"]);

        let chronological = TrendViewBuilder::new(3, TrendOrder::Chronological).build(&aggregate, today);
        assert_eq!(keys(&chronological), vec!["Nov", "Dec", "Jan"]);
    }

    #[test]
    fn current_month_figures_come_from_active_bucket() {
        let today = date(2024, 6, 15);
        let mut current = bucket(date(2024, 6, 2), 0, 2);
        current.goals_accomplished = 1;
        current.tasks_planned = 4;
        current.tasks_completed = 3;
        let aggregate = aggregate_with(vec![current, bucket(date(2024, 5, 2), 0, 7)]);

        let view = TrendViewBuilder::default().build(&aggregate, today);

        assert_eq!(view.active_month, date(2024, 6, 2));
        assert_eq!(
            (view.goals_planned, view.goals_accomplished, view.tasks_planned, view.tasks_completed),
            (2, 1, 4, 3)
        );
        assert!(view.fallback.is_empty());
    }

    #[test]
    fn missing_current_bucket_reports_zeros() {
        let view = TrendViewBuilder::default().build(
            &aggregate_with(vec![bucket(date(2024, 5, 2), 5, 1)]),
            date(2024, 6, 15),
        );
        assert_eq!(view.goals_planned, 0);
        assert_eq!(view.tasks_completed, 0);
    }

    #[test]
    fn empty_aggregate_shows_fallback_hint() {
        let view = TrendViewBuilder::default().build(&aggregate_with(vec![]), date(2024, 6, 15));
        assert_eq!(view.fallback, FALLBACK_HINT);
        assert!(view.trends.is_empty());
    }

    #[test]
    fn only_completions_still_show_fallback_hint() {
        let mut done = MonthlySummary::empty(date(2024, 6, 2));
        done.tasks_completed = 2;
        let view = TrendViewBuilder::default().build(&aggregate_with(vec![done]), date(2024, 6, 15));
        assert_eq!(view.fallback, FALLBACK_HINT);
    }

    #[test]
    fn building_does_not_change_aggregate() {
        let aggregate = aggregate_with(vec![bucket(date(2024, 6, 2), 1, 1)]);
        let before = aggregate.clone();
        let _ = TrendViewBuilder::default().build(&aggregate, date(2024, 6, 15));
        assert_eq!(aggregate, before);
    }

    #[test]
    fn view_serializes_camel_case() {
        let view = TrendViewBuilder::default().build(&aggregate_with(vec![]), date(2024, 6, 15));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["activeMonth"], "2024-06-02");
        assert_eq!(json["goalsCompletedOnTime"], 0);
        assert!(json["trends"].as_array().unwrap().is_empty());
    }
}
