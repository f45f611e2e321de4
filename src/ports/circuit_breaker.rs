//! CircuitBreaker port - Load shedding for the metrics read path.
//!
//! ## States
//!
//! - **Closed**: Normal operation, requests flow through
//! - **Open**: Too many failures, requests rejected immediately
//! - **Half-Open**: Testing if the store recovered, limited requests allowed
//!
//! ## Transitions
//!
//! ```text
//! Closed --[failure_threshold reached]--> Open
//! Open --[recovery_timeout elapsed]--> Half-Open
//! Half-Open --[success_threshold reached]--> Closed
//! Half-Open --[any failure]--> Open
//! ```

use std::time::Duration;

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation - requests flow through to the store.
    Closed,

    /// Too many failures - requests rejected without calling the store.
    /// The circuit will transition to HalfOpen after recovery_timeout.
    Open,

    /// Testing if the store recovered.
    /// Success → Closed, Failure → Open.
    HalfOpen,
}

impl CircuitState {
    pub fn allows_requests(&self) -> bool {
        matches!(self, CircuitState::Closed | CircuitState::HalfOpen)
    }
}

/// Configuration for circuit breaker behavior.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit.
    ///
    /// Default: 5 failures
    pub failure_threshold: u32,

    /// Time to wait before testing recovery (moving to half-open).
    ///
    /// Default: 30 seconds
    pub recovery_timeout: Duration,

    /// Successes in half-open state needed to close the circuit.
    ///
    /// Default: 3 successes
    pub success_threshold: u32,

    /// Trial requests admitted during one half-open period. Must be at least
    /// `success_threshold` for the circuit to be able to close.
    ///
    /// Default: 3 requests
    pub half_open_max_requests: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 3,
            half_open_max_requests: 3,
        }
    }
}

/// Port for circuit breaker functionality.
///
/// # Example
///
/// ```ignore
/// if !breaker.should_allow() {
///     return Err(MetricsError::Unavailable);
/// }
/// match repository.find_by_user_id(&user_id).await {
///     Err(e) if e.is_infrastructure() => breaker.record_failure(),
///     _ => breaker.record_success(),
/// }
/// ```
pub trait CircuitBreaker: Send + Sync {
    fn state(&self) -> CircuitState;

    /// Returns `false` while the circuit is open and the recovery timeout
    /// has not elapsed.
    fn should_allow(&self) -> bool;

    fn record_success(&self);

    fn record_failure(&self);

    /// Force reset the circuit to closed state.
    fn reset(&self);
}
