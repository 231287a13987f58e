//! # Outreach Configuration
//!
//! Configuration is layered with the `config` crate:
//!
//! 1. Built-in defaults ([`OutreachConfig::default`])
//! 2. An optional TOML file (`OUTREACH_CONFIG_PATH`, default `config/outreach.toml`)
//! 3. Environment variables prefixed `OUTREACH_`, using `__` between sections
//!
//! ## Usage
//!
//! ```rust,no_run
//! use outreach_dispatch::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // e.g. OUTREACH_FORWARDING__WEBHOOK_URL=https://hooks.example/outreach
//! let config = ConfigManager::load()?;
//! println!("default batch size: {}", config.dispatch.default_batch_size);
//! # Ok(())
//! # }
//! ```

pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants;
use crate::error::{OutreachError, OutreachResult};

pub use loader::ConfigManager;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutreachConfig {
    pub web: WebConfig,
    pub database: DatabaseConfig,
    pub dispatch: DispatchConfig,
    pub forwarding: ForwardingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind_address: String,
    pub request_timeout_ms: u64,
    /// Shared secret inbound webhook calls must present; unset disables the check
    pub webhook_secret: Option<String>,
    pub webhook_secret_header: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: constants::web::BIND_ADDRESS.to_string(),
            request_timeout_ms: constants::web::REQUEST_TIMEOUT_MS,
            webhook_secret: None,
            webhook_secret_header: constants::web::WEBHOOK_SECRET_HEADER.to_string(),
        }
    }
}

impl WebConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Database connection and pooling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/outreach_development".to_string(),
            max_connections: 10,
            acquire_timeout_seconds: 5,
            run_migrations: true,
        }
    }
}

/// Batch selection limits
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub default_batch_size: usize,
    pub max_batch_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_batch_size: constants::dispatch::DEFAULT_BATCH_SIZE,
            max_batch_size: constants::dispatch::MAX_BATCH_SIZE,
        }
    }
}

/// Outbound forwarding queue and retry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Where dispatch batches are POSTed; unset means batches cannot be forwarded
    pub webhook_url: Option<String>,
    pub request_timeout_ms: u64,
    pub queue_capacity: usize,
    pub max_attempts: u32,
    /// Batches in delivery at once, retries included
    pub max_concurrent_deliveries: usize,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    pub backoff_multiplier: f64,
    pub failure_log_capacity: usize,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            request_timeout_ms: constants::forwarding::REQUEST_TIMEOUT_MS,
            queue_capacity: constants::forwarding::QUEUE_CAPACITY,
            max_attempts: constants::forwarding::MAX_ATTEMPTS,
            max_concurrent_deliveries: constants::forwarding::MAX_CONCURRENT_DELIVERIES,
            backoff_base_ms: constants::forwarding::BACKOFF_BASE_MS,
            backoff_max_ms: constants::forwarding::BACKOFF_MAX_MS,
            backoff_multiplier: constants::forwarding::BACKOFF_MULTIPLIER,
            failure_log_capacity: constants::forwarding::FAILURE_LOG_CAPACITY,
        }
    }
}

impl ForwardingConfig {
    /// Delay before retry number `attempt` (1-based), capped at `backoff_max_ms`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let delay_ms = self.backoff_base_ms as f64 * self.backoff_multiplier.powi(exponent);
        let capped = delay_ms.min(self.backoff_max_ms as f64);
        Duration::from_millis(capped as u64)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl OutreachConfig {
    /// Reject configurations the services cannot run with
    pub fn validate(&self) -> OutreachResult<()> {
        let dispatch = &self.dispatch;
        if dispatch.default_batch_size == 0 || dispatch.max_batch_size == 0 {
            return Err(OutreachError::Configuration(
                "dispatch batch sizes must be positive".to_string(),
            ));
        }
        if dispatch.default_batch_size > dispatch.max_batch_size {
            return Err(OutreachError::Configuration(format!(
                "dispatch.default_batch_size ({}) exceeds dispatch.max_batch_size ({})",
                dispatch.default_batch_size, dispatch.max_batch_size
            )));
        }

        let forwarding = &self.forwarding;
        if forwarding.max_attempts == 0 {
            return Err(OutreachError::Configuration(
                "forwarding.max_attempts must be at least 1".to_string(),
            ));
        }
        if forwarding.max_concurrent_deliveries == 0 {
            return Err(OutreachError::Configuration(
                "forwarding.max_concurrent_deliveries must be at least 1".to_string(),
            ));
        }
        if forwarding.queue_capacity == 0 {
            return Err(OutreachError::Configuration(
                "forwarding.queue_capacity must be positive".to_string(),
            ));
        }
        if !(forwarding.backoff_multiplier >= 1.0) {
            return Err(OutreachError::Configuration(
                "forwarding.backoff_multiplier must be >= 1.0".to_string(),
            ));
        }

        if matches!(&self.web.webhook_secret, Some(secret) if secret.is_empty()) {
            return Err(OutreachError::Configuration(
                "web.webhook_secret must not be empty when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OutreachConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dispatch.default_batch_size, 10);
        assert!(config.forwarding.webhook_url.is_none());
        assert!(config.web.webhook_secret.is_none());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = OutreachConfig::default();
        config.dispatch.default_batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = OutreachConfig::default();
        config.dispatch.default_batch_size = 1000;
        assert!(config.validate().is_err());

        let mut config = OutreachConfig::default();
        config.forwarding.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = OutreachConfig::default();
        config.forwarding.max_concurrent_deliveries = 0;
        assert!(config.validate().is_err());

        let mut config = OutreachConfig::default();
        config.forwarding.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());

        let mut config = OutreachConfig::default();
        config.web.webhook_secret = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = ForwardingConfig {
            backoff_base_ms: 100,
            backoff_max_ms: 1_000,
            backoff_multiplier: 2.0,
            ..ForwardingConfig::default()
        };
        assert_eq!(config.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(config.backoff_delay(4), Duration::from_millis(800));
        assert_eq!(config.backoff_delay(5), Duration::from_millis(1_000));
        assert_eq!(config.backoff_delay(60), Duration::from_millis(1_000));
    }
}
