//! Vectra pricing configuration

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use vectra_common::{VectraError, DEFAULT_CALL_TIMEOUT_MS, TOLL_BASE_DELAY_MS, TOLL_MAX_ATTEMPTS};

use crate::integration::LoggerConfig;
use crate::retry::RetryPolicy;

/// Pricing service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Service host
    pub host: String,
    /// Service port
    pub port: u16,
    /// Deadline for a single lookup or toll attempt
    pub call_timeout_ms: u64,
    /// Toll service settings
    pub toll: TollSettings,
    /// Integration log settings
    pub log: LogSettings,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8085,
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            toll: TollSettings::default(),
            log: LogSettings::default(),
        }
    }
}

impl PricingConfig {
    /// Load configuration from `.env` and the environment
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        // PORT wins over the default, VECTRA_PORT over PORT
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse::<u16>() {
                cfg.port = p;
            }
        }

        if let Ok(host) = std::env::var("VECTRA_HOST") {
            cfg.host = host;
        }
        if let Ok(port) = std::env::var("VECTRA_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                cfg.port = p;
            }
        }
        if let Ok(val) = std::env::var("VECTRA_CALL_TIMEOUT_MS") {
            if let Ok(v) = val.parse() {
                cfg.call_timeout_ms = v;
            }
        }

        // Toll settings
        if let Ok(val) = std::env::var("VECTRA_TOLL_MAX_ATTEMPTS") {
            if let Ok(v) = val.parse() {
                cfg.toll.max_attempts = v;
            }
        }
        if let Ok(val) = std::env::var("VECTRA_TOLL_BASE_DELAY_MS") {
            if let Ok(v) = val.parse() {
                cfg.toll.base_delay_ms = v;
            }
        }
        if let Ok(val) = std::env::var("VECTRA_TOLL_FAILURE_RATE") {
            if let Ok(v) = val.parse() {
                cfg.toll.failure_rate = v;
            }
        }
        if let Ok(val) = std::env::var("VECTRA_TOLL_LATENCY_MS") {
            if let Ok(v) = val.parse() {
                cfg.toll.latency_ms = v;
            }
        }

        // Integration log settings
        if let Ok(val) = std::env::var("VECTRA_LOG_CHANNEL_BUFFER") {
            if let Ok(v) = val.parse() {
                cfg.log.channel_buffer = v;
            }
        }
        if let Ok(val) = std::env::var("VECTRA_LOG_STORE_CAPACITY") {
            if let Ok(v) = val.parse() {
                cfg.log.store_capacity = v;
            }
        }
        if let Ok(val) = std::env::var("VECTRA_LOG_JSON") {
            cfg.log.json = matches!(val.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> std::result::Result<(), VectraError> {
        if self.toll.max_attempts == 0 {
            return Err(VectraError::Config("toll.max_attempts must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.toll.failure_rate) {
            return Err(VectraError::Config(format!(
                "toll.failure_rate must be within [0, 1], got {}",
                self.toll.failure_rate
            )));
        }
        if self.log.channel_buffer == 0 {
            return Err(VectraError::Config("log.channel_buffer must be at least 1".into()));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.toll.max_attempts, Duration::from_millis(self.toll.base_delay_ms))
    }

    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            channel_buffer: self.log.channel_buffer,
            append_timeout: self.call_timeout(),
        }
    }
}

/// Toll service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TollSettings {
    /// Attempts before the estimate is abandoned
    pub max_attempts: u32,
    /// First backoff delay
    pub base_delay_ms: u64,
    /// Failure probability of the simulated provider
    pub failure_rate: f64,
    /// Latency of the simulated provider
    pub latency_ms: u64,
}

impl Default for TollSettings {
    fn default() -> Self {
        Self {
            max_attempts: TOLL_MAX_ATTEMPTS,
            base_delay_ms: TOLL_BASE_DELAY_MS,
            failure_rate: 0.05,
            latency_ms: 600,
        }
    }
}

/// Integration log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// Logger channel buffer
    pub channel_buffer: usize,
    /// Entries kept by the in-memory log store
    pub store_capacity: usize,
    /// Emit JSON tracing output
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            store_capacity: 10_000,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = PricingConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.port, 8085);
        assert_eq!(cfg.call_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.retry_policy(), RetryPolicy::toll_service());
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let mut cfg = PricingConfig::default();
        cfg.toll.max_attempts = 0;
        assert!(matches!(cfg.validate(), Err(VectraError::Config(_))));
    }

    #[test]
    fn test_rejects_failure_rate_out_of_range() {
        let mut cfg = PricingConfig::default();
        cfg.toll.failure_rate = 1.5;
        assert!(cfg.validate().is_err());
        cfg.toll.failure_rate = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_channel_buffer() {
        let mut cfg = PricingConfig::default();
        cfg.log.channel_buffer = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_logger_config_uses_call_timeout() {
        let mut cfg = PricingConfig::default();
        cfg.call_timeout_ms = 250;
        cfg.log.channel_buffer = 8;
        let logger = cfg.logger_config();
        assert_eq!(logger.channel_buffer, 8);
        assert_eq!(logger.append_timeout, Duration::from_millis(250));
    }
}
