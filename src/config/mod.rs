//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `GOAL_METRICS` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use goal_metrics::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod metrics;
mod redis;
mod scoring;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use metrics::MetricsConfig;
pub use redis::RedisConfig;
pub use scoring::ScoringConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Metric store (PostgreSQL)
    pub database: DatabaseConfig,

    /// Event transport (Redis pub/sub)
    pub redis: RedisConfig,

    /// Scoring constants
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Store timeouts, trend window, circuit breaker
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `GOAL_METRICS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `GOAL_METRICS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `GOAL_METRICS__SCORING__DEFER_PENALTY=3` -> `scoring.defer_penalty = 3`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GOAL_METRICS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.scoring.validate()?;
        self.metrics.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
