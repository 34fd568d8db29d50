//! Error types used throughout the booking engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for SlotBook
///
/// The first four variants are the caller-facing taxonomy. A `NotFound` is
/// deliberately indistinguishable between "does not exist" and "belongs to
/// another tenant".
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SlotbookError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transient error: {0}")]
    Transient(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`SlotbookError`] for callers that only need
/// to decide between re-prompting, reporting absence, offering an
/// alternative, or retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Transient,
    Internal,
}

impl SlotbookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Transient(_) => ErrorKind::Transient,
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the whole operation may be retried from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Shorthand for a missing required field.
    pub fn missing_field(field: &str) -> Self {
        Self::Validation(format!("missing required field: {field}"))
    }
}

/// Result type alias for SlotBook operations
pub type Result<T> = std::result::Result<T, SlotbookError>;
