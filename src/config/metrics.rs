//! Aggregation and read-path tuning

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::metrics::{TrendOrder, TrendViewBuilder, DEFAULT_WINDOW_MONTHS};
use crate::ports::CircuitBreakerConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Deadline for a single store call, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Trailing window of the trend view, in months
    #[serde(default = "default_trend_window")]
    pub trend_window_months: u32,

    /// Order trends by (year, month) instead of month number only
    #[serde(default)]
    pub chronological_trends: bool,

    #[serde(default = "default_failure_threshold")]
    pub circuit_failure_threshold: u32,

    #[serde(default = "default_recovery_secs")]
    pub circuit_recovery_secs: u64,

    #[serde(default = "default_success_threshold")]
    pub circuit_success_threshold: u32,

    /// Trial reads admitted while the circuit is half-open
    #[serde(default = "default_half_open_max_requests")]
    pub circuit_half_open_max_requests: u32,
}

impl MetricsConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn trend_builder(&self) -> TrendViewBuilder {
        let order = if self.chronological_trends {
            TrendOrder::Chronological
        } else {
            TrendOrder::MonthNumber
        };
        TrendViewBuilder::new(self.trend_window_months, order)
    }

    pub fn circuit_breaker(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.circuit_failure_threshold,
            recovery_timeout: Duration::from_secs(self.circuit_recovery_secs),
            success_threshold: self.circuit_success_threshold,
            half_open_max_requests: self.circuit_half_open_max_requests,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.store_timeout_ms == 0 || self.store_timeout_ms > 60_000 {
            return Err(ValidationError::InvalidStoreTimeout);
        }
        if self.trend_window_months == 0 || self.trend_window_months > 24 {
            return Err(ValidationError::InvalidTrendWindow);
        }
        if self.circuit_failure_threshold == 0 || self.circuit_success_threshold == 0 {
            return Err(ValidationError::InvalidCircuitBreaker);
        }
        if self.circuit_half_open_max_requests < self.circuit_success_threshold {
            return Err(ValidationError::InvalidCircuitBreaker);
        }
        Ok(())
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: default_store_timeout_ms(),
            trend_window_months: default_trend_window(),
            chronological_trends: false,
            circuit_failure_threshold: default_failure_threshold(),
            circuit_recovery_secs: default_recovery_secs(),
            circuit_success_threshold: default_success_threshold(),
            circuit_half_open_max_requests: default_half_open_max_requests(),
        }
    }
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

fn default_trend_window() -> u32 {
    DEFAULT_WINDOW_MONTHS
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_recovery_secs() -> u64 {
    30
}

fn default_success_threshold() -> u32 {
    3
}

fn default_half_open_max_requests() -> u32 {
    3
}
