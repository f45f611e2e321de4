//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `MetricRepository` - Per-user aggregate persistence
//! - `EventSubscriber` / `EventHandler` - Lifecycle event delivery
//! - `CircuitBreaker` - Read-path resilience
//! - `Clock` - Current calendar date

mod circuit_breaker;
mod clock;
mod event_subscriber;
mod metric_repository;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use clock::{Clock, FixedClock, SystemClock};
pub use event_subscriber::{EventHandler, EventSubscriber};
pub use metric_repository::MetricRepository;
