//! Lifecycle events consumed by the metrics aggregator.
//!
//! Events arrive as loosely-typed [`RawMetricEvent`] envelopes on one of
//! three streams. [`MetricEvent::decode`] turns an envelope into a closed
//! union where every variant carries the payload it needs, so nothing
//! downstream has to check for missing data.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use super::errors::MetricsError;
use super::goal::{Goal, Task};
use crate::domain::foundation::{Timestamp, UserId};

/// Transport stream an event was delivered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStream {
    Goals,
    Tasks,
    Users,
}

impl EventStream {
    pub const ALL: [EventStream; 3] = [EventStream::Goals, EventStream::Tasks, EventStream::Users];

    /// Channel name on the message bus.
    pub fn channel(&self) -> &'static str {
        match self {
            EventStream::Goals => "input-goals",
            EventStream::Tasks => "input-tasks",
            EventStream::Users => "input-dashboard",
        }
    }

    pub fn from_channel(channel: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.channel() == channel)
    }

    /// Short noun used in log and error messages.
    pub fn subject(&self) -> &'static str {
        match self {
            EventStream::Goals => "goal",
            EventStream::Tasks => "task",
            EventStream::Users => "user",
        }
    }

    pub fn accepts(&self, event_type: EventType) -> bool {
        match self {
            EventStream::Goals => matches!(
                event_type,
                EventType::GoalAdded
                    | EventType::GoalCompleted
                    | EventType::GoalDeferred
                    | EventType::GoalResumed
            ),
            EventStream::Tasks => {
                matches!(event_type, EventType::TaskAdded | EventType::TaskCompleted)
            }
            EventStream::Users => matches!(event_type, EventType::UserAdded),
        }
    }
}

impl fmt::Display for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.channel())
    }
}

/// Event type tag carried by every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    GoalAdded,
    GoalCompleted,
    GoalDeferred,
    GoalResumed,
    TaskAdded,
    TaskCompleted,
    UserAdded,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::GoalAdded => "GOAL_ADDED",
            EventType::GoalCompleted => "GOAL_COMPLETED",
            EventType::GoalDeferred => "GOAL_DEFERRED",
            EventType::GoalResumed => "GOAL_RESUMED",
            EventType::TaskAdded => "TASK_ADDED",
            EventType::TaskCompleted => "TASK_COMPLETED",
            EventType::UserAdded => "USER_ADDED",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GOAL_ADDED" => Ok(EventType::GoalAdded),
            "GOAL_COMPLETED" => Ok(EventType::GoalCompleted),
            "GOAL_DEFERRED" => Ok(EventType::GoalDeferred),
            "GOAL_RESUMED" => Ok(EventType::GoalResumed),
            "TASK_ADDED" => Ok(EventType::TaskAdded),
            "TASK_COMPLETED" => Ok(EventType::TaskCompleted),
            "USER_ADDED" => Ok(EventType::UserAdded),
            _ => Err(()),
        }
    }
}

/// Wire envelope as published by upstream services.
///
/// The type tag is kept as a string so that unknown tags surface as
/// [`MetricsError::UnrecognizedEvent`] instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetricEvent {
    #[serde(rename = "type", alias = "eventType")]
    pub event_type: String,
    pub key: String,
    #[serde(default, alias = "eventCreatedAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub data: Option<JsonValue>,
}

impl RawMetricEvent {
    pub fn new(event_type: impl Into<String>, key: impl Into<String>, data: Option<JsonValue>) -> Self {
        Self {
            event_type: event_type.into(),
            key: key.into(),
            created_at: Some(Timestamp::now()),
            data,
        }
    }
}

/// A decoded event. Each variant structurally carries its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricEvent {
    GoalAdded(Goal),
    GoalCompleted(Goal),
    GoalDeferred(Goal),
    GoalResumed(Goal),
    TaskAdded(Task),
    TaskCompleted(Task),
    UserAdded { user_id: UserId },
}

impl MetricEvent {
    /// Decodes an envelope received on `stream`.
    ///
    /// Goal and task streams validate the payload before the type tag, so a
    /// missing payload is reported as a data error even when the tag is also
    /// wrong. The user stream ignores the payload and takes the user id from
    /// the envelope key.
    pub fn decode(stream: EventStream, raw: &RawMetricEvent) -> Result<Self, MetricsError> {
        match stream {
            EventStream::Goals => {
                let goal: Goal = decode_payload(raw)?;
                match parse_type(stream, &raw.event_type)? {
                    EventType::GoalAdded => Ok(MetricEvent::GoalAdded(goal)),
                    EventType::GoalCompleted => Ok(MetricEvent::GoalCompleted(goal)),
                    EventType::GoalDeferred => Ok(MetricEvent::GoalDeferred(goal)),
                    EventType::GoalResumed => Ok(MetricEvent::GoalResumed(goal)),
                    _ => Err(unrecognized(stream, &raw.event_type)),
                }
            }
            EventStream::Tasks => {
                let task: Task = decode_payload(raw)?;
                match parse_type(stream, &raw.event_type)? {
                    EventType::TaskAdded => Ok(MetricEvent::TaskAdded(task)),
                    EventType::TaskCompleted => Ok(MetricEvent::TaskCompleted(task)),
                    _ => Err(unrecognized(stream, &raw.event_type)),
                }
            }
            EventStream::Users => match parse_type(stream, &raw.event_type)? {
                EventType::UserAdded => {
                    let user_id = UserId::new(raw.key.clone())
                        .map_err(|e| MetricsError::data_format(e.to_string()))?;
                    Ok(MetricEvent::UserAdded { user_id })
                }
                _ => Err(unrecognized(stream, &raw.event_type)),
            },
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            MetricEvent::GoalAdded(_) => EventType::GoalAdded,
            MetricEvent::GoalCompleted(_) => EventType::GoalCompleted,
            MetricEvent::GoalDeferred(_) => EventType::GoalDeferred,
            MetricEvent::GoalResumed(_) => EventType::GoalResumed,
            MetricEvent::TaskAdded(_) => EventType::TaskAdded,
            MetricEvent::TaskCompleted(_) => EventType::TaskCompleted,
            MetricEvent::UserAdded { .. } => EventType::UserAdded,
        }
    }

    /// The user whose aggregate this event touches.
    pub fn user_id(&self) -> &UserId {
        match self {
            MetricEvent::GoalAdded(goal)
            | MetricEvent::GoalCompleted(goal)
            | MetricEvent::GoalDeferred(goal)
            | MetricEvent::GoalResumed(goal) => &goal.user_id,
            MetricEvent::TaskAdded(task) | MetricEvent::TaskCompleted(task) => &task.user_id,
            MetricEvent::UserAdded { user_id } => user_id,
        }
    }
}

fn decode_payload<T: serde::de::DeserializeOwned>(raw: &RawMetricEvent) -> Result<T, MetricsError> {
    let data = match &raw.data {
        Some(data) if !data.is_null() => data.clone(),
        _ => return Err(MetricsError::data_format("payload missing")),
    };
    serde_json::from_value(data).map_err(|e| MetricsError::data_format(format!("payload has unexpected shape: {}", e)))
}

fn parse_type(stream: EventStream, tag: &str) -> Result<EventType, MetricsError> {
    let event_type: EventType = tag.parse().map_err(|_| unrecognized(stream, tag))?;
    if !stream.accepts(event_type) {
        return Err(unrecognized(stream, tag));
    }
    Ok(event_type)
}

fn unrecognized(stream: EventStream, tag: &str) -> MetricsError {
    MetricsError::UnrecognizedEvent {
        stream: stream.subject().to_string(),
        event_type: tag.to_string(),
    }
}
