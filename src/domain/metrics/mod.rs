//! Goal and task metrics.
//!
//! - `scoring` - score deltas for goal transitions
//! - `summary` - month-bucketed tallies keyed by anchor date
//! - `aggregate` - per-user scoreboard and its event-driven transitions
//! - `trend` - read-side trend projection
//! - `events` - wire envelope and decoded event union
//! - `goal` - goal and task payloads

mod aggregate;
mod errors;
mod events;
mod goal;
mod scoring;
mod summary;
mod trend;

pub use aggregate::MetricAggregate;
pub use errors::MetricsError;
pub use events::{EventStream, EventType, MetricEvent, RawMetricEvent};
pub use goal::{Goal, GoalLevel, GoalStatus, Task};
pub use scoring::{Completion, CompletionTiming, ScoreCalculator, ScorePolicy};
pub use summary::{month_anchor, MonthlySummary, MonthlySummaryIndex, SummaryMutation, ANCHOR_DAY};
pub use trend::{GoalTrend, TrendOrder, TrendView, TrendViewBuilder, DEFAULT_WINDOW_MONTHS, FALLBACK_HINT};
