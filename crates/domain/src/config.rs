//! Configuration management

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    /// Wait on a competing writer; must stay below the request timeout.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Scheduling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// IANA timezone applied to tenants that do not declare their own.
    pub default_timezone: String,
    /// Upper bound for each persistence call made while serving a request.
    pub request_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

fn default_busy_timeout_ms() -> u64 {
    2_000
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self { default_timezone: "America/Sao_Paulo".to_string(), request_timeout_ms: 5_000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "slotbook.db".to_string(),
                pool_size: 8,
                busy_timeout_ms: default_busy_timeout_ms(),
            },
            scheduling: SchedulingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
