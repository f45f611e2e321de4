//! Goal and task payloads carried by lifecycle events.
//!
//! These are read-only snapshots published by the services that own goals
//! and tasks. Only the fields that drive scoring are required; descriptive
//! fields are kept so a payload survives a decode/encode cycle intact.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{GoalId, TaskId, UserId};

/// Difficulty level chosen when a goal is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalLevel {
    #[serde(rename = "Easy", alias = "EASY", alias = "easy")]
    Easy,
    #[serde(rename = "Moderate", alias = "MODERATE", alias = "moderate")]
    Moderate,
    #[serde(rename = "Extreme", alias = "EXTREME", alias = "extreme")]
    Extreme,
}

/// Lifecycle status as reported by the goals service.
///
/// Informational only: the transition applied to the scoreboard is chosen by
/// the event type, never by this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GoalStatus {
    #[default]
    #[serde(rename = "A", alias = "ACTIVE")]
    Active,
    #[serde(rename = "D", alias = "DEFERRED")]
    Deferred,
    #[serde(rename = "C", alias = "COMPLETED")]
    Completed,
}

/// A goal snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    pub level: GoalLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<NaiveDate>,
    #[serde(default)]
    pub status: GoalStatus,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub votes: i32,
}

impl Goal {
    /// Creates a goal with only the scoring-relevant fields populated.
    pub fn new(id: GoalId, user_id: UserId, level: GoalLevel, due_date: NaiveDate) -> Self {
        Self {
            id,
            user_id,
            name: None,
            description: None,
            notes: Vec::new(),
            level,
            completed_on: None,
            status: GoalStatus::Active,
            due_date,
            votes: 0,
        }
    }
}

/// A task snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: NaiveDate,
}

impl Task {
    pub fn new(id: TaskId, user_id: UserId, due_date: NaiveDate) -> Self {
        Self {
            id,
            user_id,
            name: None,
            description: None,
            due_date,
        }
    }
}
