//! Commands exposed to the conversational tool layer.
//!
//! Each command takes the [`AppContext`](crate::AppContext), a trusted
//! [`TenantContext`](slotbook_domain::TenantContext) established by the
//! caller and a request DTO. Failures come back as a serializable
//! [`CommandError`].

pub mod availability;
pub mod bookings;
pub mod client;

pub use availability::*;
pub use bookings::*;
pub use client::*;

use serde::Serialize;
use slotbook_domain::{ErrorKind, SlotbookError};

/// Result type returned by every command.
pub type CommandResult<T> = std::result::Result<T, CommandError>;

/// Error surfaced to callers of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandError {
    pub kind: ErrorKind,
    /// HTTP-style status for transports that want one
    pub status: u16,
    pub message: String,
}

impl CommandError {
    /// Whether the same call may succeed if retried unchanged.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::Transient
    }
}

impl From<SlotbookError> for CommandError {
    fn from(err: SlotbookError) -> Self {
        let kind = err.kind();
        let status = match kind {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Transient => 503,
            ErrorKind::Internal => 500,
        };
        // Storage and configuration details stay in the logs.
        let message = match kind {
            ErrorKind::Internal => "internal error".to_string(),
            _ => err.to_string(),
        };
        Self { kind, status, message }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}: {}", self.status, self.kind, self.message)
    }
}

impl std::error::Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        let cases = [
            (SlotbookError::Validation("bad".into()), 400),
            (SlotbookError::NotFound("gone".into()), 404),
            (SlotbookError::Conflict("taken".into()), 409),
            (SlotbookError::Transient("busy".into()), 503),
            (SlotbookError::Database("disk".into()), 500),
            (SlotbookError::Config("cfg".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(CommandError::from(err).status, status);
        }
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = CommandError::from(SlotbookError::Database("/var/lib/slotbook.db: corrupt".into()));
        assert_eq!(err.message, "internal error");
        assert!(!err.is_retryable());

        let err = CommandError::from(SlotbookError::Conflict("slot 10:00 is taken".into()));
        assert!(err.message.contains("10:00"));
    }

    #[test]
    fn serializes_kind_in_snake_case() {
        let err = CommandError::from(SlotbookError::NotFound("booking b-1".into()));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["kind"], "not_found");
        assert_eq!(value["status"], 404);
    }
}
