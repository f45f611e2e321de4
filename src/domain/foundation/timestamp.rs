//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_now_is_monotonic() {
        let first = Timestamp::now();
        let second = Timestamp::now();
        assert!(first <= second);
    }

    #[test]
    fn timestamp_round_trips_rfc3339() {
        let json = "\"2024-01-15T10:30:00Z\"";
        let ts: Timestamp = serde_json::from_str(json).unwrap();

        assert_eq!(serde_json::to_string(&ts).unwrap(), json);
    }

    #[test]
    fn timestamp_ordering_works() {
        let early: Timestamp = serde_json::from_str("\"2024-01-15T10:30:00Z\"").unwrap();
        let late: Timestamp = serde_json::from_str("\"2024-01-15T10:31:00Z\"").unwrap();

        assert!(early < late);
    }
}
