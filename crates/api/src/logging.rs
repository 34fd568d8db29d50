//! Tracing subscriber setup and command logging helpers.

use std::time::Duration;

use slotbook_domain::{LoggingConfig, SlotbookError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this twice is
/// harmless: the second install fails quietly and the first subscriber
/// stays in place.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let result = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    if let Err(err) = result {
        tracing::debug!(error = %err, "tracing subscriber already installed");
    }
}

/// Log the outcome of a command execution with structured fields.
///
/// Callers must avoid forwarding client data in `command`.
#[inline]
pub fn log_command_execution(
    command: &str,
    tenant_id: &str,
    elapsed: Duration,
    error: Option<&SlotbookError>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error {
        None => info!(command, tenant_id, duration_ms, "command_execution_success"),
        Some(err) => warn!(
            command,
            tenant_id,
            duration_ms,
            error_type = error_label(err),
            error = %err,
            "command_execution_failure"
        ),
    }
}

/// Convert a `SlotbookError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &SlotbookError) -> &'static str {
    match error {
        SlotbookError::Validation(_) => "validation",
        SlotbookError::NotFound(_) => "not_found",
        SlotbookError::Conflict(_) => "conflict",
        SlotbookError::Transient(_) => "transient",
        SlotbookError::Database(_) => "database",
        SlotbookError::Config(_) => "config",
        SlotbookError::Internal(_) => "internal",
    }
}
