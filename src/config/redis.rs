//! Redis configuration (event transport)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,

    /// Deadline in seconds for connecting and for each channel subscription
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Subscribe to lifecycle channels on startup
    #[serde(default = "default_subscribe")]
    pub subscribe: bool,
}

impl RedisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS_URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout(),
            subscribe: default_subscribe(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}

fn default_subscribe() -> bool {
    true
}
