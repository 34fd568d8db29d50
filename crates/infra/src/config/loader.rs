//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Whatever the source, the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `SLOTBOOK_DB_PATH`: Database file path (required)
//! - `SLOTBOOK_DB_POOL_SIZE`: Connection pool size (required)
//! - `SLOTBOOK_DB_BUSY_TIMEOUT_MS`: SQLite busy timeout in milliseconds
//! - `SLOTBOOK_DEFAULT_TIMEZONE`: IANA timezone for tenants without one
//! - `SLOTBOOK_REQUEST_TIMEOUT_MS`: Bound on each persistence call
//! - `SLOTBOOK_LOG_LEVEL`: Default log filter when `RUST_LOG` is unset
//! - `SLOTBOOK_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./slotbook.json` or `./slotbook.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono_tz::Tz;
use slotbook_domain::{
    Config, DatabaseConfig, LoggingConfig, Result, SchedulingConfig, SlotbookError,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SlotbookError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or a value fails validation
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The database path and pool size are required; every other variable
/// falls back to its default.
///
/// # Errors
/// Returns `SlotbookError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let scheduling_defaults = SchedulingConfig::default();
    let logging_defaults = LoggingConfig::default();
    let database_defaults = Config::default().database;

    let config = Config {
        database: DatabaseConfig {
            path: env_var("SLOTBOOK_DB_PATH")?,
            pool_size: env_parse("SLOTBOOK_DB_POOL_SIZE")?,
            busy_timeout_ms: env_parse_or(
                "SLOTBOOK_DB_BUSY_TIMEOUT_MS",
                database_defaults.busy_timeout_ms,
            )?,
        },
        scheduling: SchedulingConfig {
            default_timezone: std::env::var("SLOTBOOK_DEFAULT_TIMEZONE")
                .unwrap_or(scheduling_defaults.default_timezone),
            request_timeout_ms: env_parse_or(
                "SLOTBOOK_REQUEST_TIMEOUT_MS",
                scheduling_defaults.request_timeout_ms,
            )?,
        },
        logging: LoggingConfig {
            level: std::env::var("SLOTBOOK_LOG_LEVEL").unwrap_or(logging_defaults.level),
            json: env_bool("SLOTBOOK_LOG_JSON", logging_defaults.json),
        },
    };

    validate(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SlotbookError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or a value fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SlotbookError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SlotbookError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SlotbookError::Config(format!("Failed to read config file: {e}")))?;

    validate(parse_config(&contents, &config_path)?)
}

/// Check values that serde cannot.
///
/// # Errors
/// Returns `SlotbookError::Config` for a zero pool size, a zero request
/// timeout, a busy timeout that is not below the request timeout, or a
/// default timezone that is not a known IANA name.
pub fn validate(config: Config) -> Result<Config> {
    if config.database.pool_size == 0 {
        return Err(SlotbookError::Config("database pool size must be at least 1".into()));
    }
    if config.scheduling.request_timeout_ms == 0 {
        return Err(SlotbookError::Config("request timeout must be positive".into()));
    }
    if config.database.busy_timeout_ms >= config.scheduling.request_timeout_ms {
        return Err(SlotbookError::Config(format!(
            "busy timeout ({} ms) must be below the request timeout ({} ms)",
            config.database.busy_timeout_ms, config.scheduling.request_timeout_ms
        )));
    }
    default_timezone(&config)?;
    Ok(config)
}

/// The configured default timezone as a [`Tz`].
///
/// # Errors
/// Returns `SlotbookError::Config` if the name is not a known IANA zone.
pub fn default_timezone(config: &Config) -> Result<Tz> {
    Tz::from_str(&config.scheduling.default_timezone).map_err(|_| {
        SlotbookError::Config(format!(
            "Unknown default timezone: {}",
            config.scheduling.default_timezone
        ))
    })
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SlotbookError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SlotbookError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SlotbookError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(base: &Path) -> Vec<PathBuf> {
    vec![
        base.join("config.json"),
        base.join("config.toml"),
        base.join("slotbook.json"),
        base.join("slotbook.toml"),
        base.join("../config.json"),
        base.join("../config.toml"),
        base.join("../../config.json"),
        base.join("../../config.toml"),
    ]
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        SlotbookError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse a required numeric environment variable
fn env_parse<T: FromStr>(key: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    env_var(key)?
        .trim()
        .parse::<T>()
        .map_err(|e| SlotbookError::Config(format!("Invalid value for {key}: {e}")))
}

/// Parse an optional numeric environment variable
fn env_parse_or<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(_) => env_parse(key),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 7] = [
        "SLOTBOOK_DB_PATH",
        "SLOTBOOK_DB_POOL_SIZE",
        "SLOTBOOK_DB_BUSY_TIMEOUT_MS",
        "SLOTBOOK_DEFAULT_TIMEZONE",
        "SLOTBOOK_REQUEST_TIMEOUT_MS",
        "SLOTBOOK_LOG_LEVEL",
        "SLOTBOOK_LOG_JSON",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for value in ["1", "true", "yes", "on", "TRUE"] {
            std::env::set_var("SLOTBOOK_TEST_BOOL", value);
            assert!(env_bool("SLOTBOOK_TEST_BOOL", false), "{value} should be true");
        }
        for value in ["0", "false", "no", "off"] {
            std::env::set_var("SLOTBOOK_TEST_BOOL", value);
            assert!(!env_bool("SLOTBOOK_TEST_BOOL", true), "{value} should be false");
        }

        std::env::remove_var("SLOTBOOK_TEST_BOOL");
        assert!(env_bool("SLOTBOOK_TEST_BOOL", true));
        assert!(!env_bool("SLOTBOOK_TEST_BOOL", false));
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("SLOTBOOK_DB_PATH", "/tmp/test.db");
        std::env::set_var("SLOTBOOK_DB_POOL_SIZE", "5");
        std::env::set_var("SLOTBOOK_DB_BUSY_TIMEOUT_MS", "500");
        std::env::set_var("SLOTBOOK_DEFAULT_TIMEZONE", "Europe/Lisbon");
        std::env::set_var("SLOTBOOK_REQUEST_TIMEOUT_MS", "750");
        std::env::set_var("SLOTBOOK_LOG_LEVEL", "debug");
        std::env::set_var("SLOTBOOK_LOG_JSON", "true");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config loads from env");
        assert_eq!(config.database.path, "/tmp/test.db");
        assert_eq!(config.database.pool_size, 5);
        assert_eq!(config.database.busy_timeout_ms, 500);
        assert_eq!(config.scheduling.default_timezone, "Europe/Lisbon");
        assert_eq!(config.scheduling.request_timeout_ms, 750);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_env_uses_defaults_for_optional_vars() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("SLOTBOOK_DB_PATH", "/tmp/test.db");
        std::env::set_var("SLOTBOOK_DB_POOL_SIZE", "3");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config loads from env");
        assert_eq!(config.scheduling, SchedulingConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.database.busy_timeout_ms, 2_000);
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, SlotbookError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("SLOTBOOK_DB_PATH", "/tmp/test.db");
        std::env::set_var("SLOTBOOK_DB_POOL_SIZE", "not-a-number");
        assert!(matches!(load_from_env(), Err(SlotbookError::Config(_))));

        std::env::set_var("SLOTBOOK_DB_POOL_SIZE", "4");
        std::env::set_var("SLOTBOOK_DEFAULT_TIMEZONE", "Mars/Olympus");
        assert!(matches!(load_from_env(), Err(SlotbookError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_parse_config_json_with_defaults() {
        let json_content = r#"{ "database": { "path": "test.db", "pool_size": 4 } }"#;

        let config = parse_config(json_content, &PathBuf::from("test.json")).unwrap();
        assert_eq!(config.database.busy_timeout_ms, 2_000);
        assert_eq!(config.scheduling.default_timezone, "America/Sao_Paulo");
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_content = r#"
[database]
path = "test.db"
pool_size = 6

[scheduling]
default_timezone = "America/Manaus"
request_timeout_ms = 1500

[logging]
level = "warn"
json = true
"#;

        let config = parse_config(toml_content, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(config.database.pool_size, 6);
        assert_eq!(config.scheduling.request_timeout_ms, 1500);
        assert!(config.logging.json);
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("test.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_validate_rejects_zero_pool() {
        let mut config = Config::default();
        config.database.pool_size = 0;
        assert!(matches!(validate(config), Err(SlotbookError::Config(_))));
        assert!(validate(Config::default()).is_ok());
    }

    #[test]
    fn test_validate_requires_busy_timeout_below_request_timeout() {
        let mut config = Config::default();
        config.scheduling.request_timeout_ms = 1_000;

        config.database.busy_timeout_ms = 1_000;
        assert!(matches!(validate(config.clone()), Err(SlotbookError::Config(_))));

        config.database.busy_timeout_ms = 5_000;
        assert!(matches!(validate(config.clone()), Err(SlotbookError::Config(_))));

        config.database.busy_timeout_ms = 999;
        assert!(validate(config).is_ok());
    }
}
