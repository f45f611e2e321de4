//! In-process adapters for tests and local runs.

mod metric_repository;

pub use metric_repository::InMemoryMetricRepository;
