//! Failure taxonomy for metric transitions and queries.

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Errors that can occur while applying an event or serving a view.
///
/// Every failure leaves the stored aggregate exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    /// Payload missing or not of the expected shape.
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Event type not valid for the stream it arrived on.
    #[error("Incorrect event type: {event_type}, expected a relevant {stream} event")]
    UnrecognizedEvent { stream: String, event_type: String },

    #[error("User records not found: {0}")]
    UserNotFound(UserId),

    #[error("User {caller} may not act on metrics of {target}")]
    Forbidden { caller: UserId, target: UserId },

    /// Persistence failure, including store timeouts.
    #[error("Store failure: {0}")]
    Store(String),

    /// The read path is shedding load (circuit open).
    #[error("Metrics temporarily unavailable")]
    Unavailable,
}

impl MetricsError {
    pub fn data_format(msg: impl Into<String>) -> Self {
        MetricsError::DataFormat(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        MetricsError::Store(msg.into())
    }

    /// Error code used when the failure crosses into the generic domain error.
    pub fn code(&self) -> ErrorCode {
        match self {
            MetricsError::DataFormat(_) => ErrorCode::DataFormatError,
            MetricsError::UnrecognizedEvent { .. } => ErrorCode::UnrecognizedEvent,
            MetricsError::UserNotFound(_) => ErrorCode::UserNotFound,
            MetricsError::Forbidden { .. } => ErrorCode::Forbidden,
            MetricsError::Store(_) => ErrorCode::DatabaseError,
            MetricsError::Unavailable => ErrorCode::ServiceUnavailable,
        }
    }

    /// Whether the failure reflects infrastructure health rather than input.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, MetricsError::Store(_))
    }
}

impl From<MetricsError> for DomainError {
    fn from(err: MetricsError) -> Self {
        let domain = DomainError::new(err.code(), err.to_string());
        match err {
            MetricsError::UnrecognizedEvent { stream, event_type } => domain
                .with_detail("stream", stream)
                .with_detail("event_type", event_type),
            MetricsError::UserNotFound(user_id) => domain.with_detail("user_id", user_id.as_str()),
            _ => domain,
        }
    }
}
