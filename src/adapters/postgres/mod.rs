//! PostgreSQL adapters.

mod metric_repository;

pub use metric_repository::PostgresMetricRepository;
