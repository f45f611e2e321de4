//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `events` - Event transports (in-memory, Redis pub/sub)
//! - `http` - REST API (axum)
//! - `memory` - In-process repository
//! - `postgres` - PostgreSQL repository (sqlx)
//! - `resilience` - Circuit breaker

pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod resilience;

pub use events::{InMemoryEventBus, RedisEventSubscriber};
pub use memory::InMemoryMetricRepository;
pub use postgres::PostgresMetricRepository;
pub use resilience::InMemoryCircuitBreaker;
