//! Application configuration management
//!
//! This module handles loading and validating configuration from environment
//! variables. All configuration is loaded at startup and validated before the
//! application runs.

use std::env;
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_JUDGE_TIMEOUT_SECONDS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MEMORY_LIMIT_MB, DEFAULT_POLL_INTERVAL_SECONDS, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, DEFAULT_STALE_CLAIM_SECONDS, DEFAULT_SWEEP_BATCH,
    DEFAULT_TIME_LIMIT_SECONDS, DEFAULT_WORKER_LIMIT,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::from_env().expect("Failed to load configuration from environment"));

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub dispatcher: DispatcherConfig,
    pub judge: JudgeConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Evaluation dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sleep between background sweep cycles that found no work
    pub poll_interval_seconds: u64,
    /// Upper bound on a single judge invocation
    pub judge_timeout_seconds: u64,
    /// Failed submissions are retried until this many attempts were made
    pub max_attempts: i32,
    /// Concurrent judge calls per sweep cycle
    pub worker_limit: usize,
    /// Age after which an in-progress claim is treated as abandoned
    pub stale_claim_seconds: u64,
    /// Maximum submissions picked up per sweep cycle
    pub sweep_batch: i64,
}

/// Judge sandbox configuration
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    pub memory_limit_mb: u64,
    pub time_limit_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            dispatcher: DispatcherConfig::from_env()?,
            judge: JudgeConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DEFAULT_DATABASE_MAX_CONNECTIONS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,
        })
    }
}

impl DispatcherConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            poll_interval_seconds: env::var("DISPATCHER_POLL_INTERVAL_SECONDS")
                .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_SECONDS.to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("DISPATCHER_POLL_INTERVAL_SECONDS".to_string())
                })?,
            judge_timeout_seconds: env::var("JUDGE_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| DEFAULT_JUDGE_TIMEOUT_SECONDS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JUDGE_TIMEOUT_SECONDS".to_string()))?,
            max_attempts: env::var("DISPATCHER_MAX_ATTEMPTS")
                .unwrap_or_else(|_| DEFAULT_MAX_ATTEMPTS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DISPATCHER_MAX_ATTEMPTS".to_string()))?,
            worker_limit: env::var("DISPATCHER_WORKER_LIMIT")
                .unwrap_or_else(|_| DEFAULT_WORKER_LIMIT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DISPATCHER_WORKER_LIMIT".to_string()))?,
            stale_claim_seconds: env::var("DISPATCHER_STALE_CLAIM_SECONDS")
                .unwrap_or_else(|_| DEFAULT_STALE_CLAIM_SECONDS.to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("DISPATCHER_STALE_CLAIM_SECONDS".to_string())
                })?,
            sweep_batch: env::var("DISPATCHER_SWEEP_BATCH")
                .unwrap_or_else(|_| DEFAULT_SWEEP_BATCH.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DISPATCHER_SWEEP_BATCH".to_string()))?,
        })
    }

    /// Sleep between empty sweep cycles
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Upper bound on a single judge invocation
    pub fn judge_timeout(&self) -> Duration {
        Duration::from_secs(self.judge_timeout_seconds)
    }

    /// Age after which an in-progress claim is treated as abandoned
    pub fn stale_claim_after(&self) -> Duration {
        Duration::from_secs(self.stale_claim_seconds)
    }
}

impl JudgeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            memory_limit_mb: env::var("JUDGE_MEMORY_LIMIT_MB")
                .unwrap_or_else(|_| DEFAULT_MEMORY_LIMIT_MB.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JUDGE_MEMORY_LIMIT_MB".to_string()))?,
            time_limit_seconds: env::var("JUDGE_TIME_LIMIT_SECONDS")
                .unwrap_or_else(|_| DEFAULT_TIME_LIMIT_SECONDS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JUDGE_TIME_LIMIT_SECONDS".to_string()))?,
        })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // Test that defaults are applied when env vars are not set
        let server = ServerConfig {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
        };
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn test_dispatcher_durations() {
        let dispatcher = DispatcherConfig {
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            judge_timeout_seconds: DEFAULT_JUDGE_TIMEOUT_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            worker_limit: DEFAULT_WORKER_LIMIT,
            stale_claim_seconds: DEFAULT_STALE_CLAIM_SECONDS,
            sweep_batch: DEFAULT_SWEEP_BATCH,
        };
        assert_eq!(dispatcher.poll_interval(), Duration::from_secs(10));
        assert_eq!(dispatcher.judge_timeout(), Duration::from_secs(30));
        assert_eq!(dispatcher.stale_claim_after(), Duration::from_secs(300));
    }
}
