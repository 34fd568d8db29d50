//! Conversions from external infrastructure errors into domain errors.

use rusqlite::Error as SqlError;
use slotbook_domain::SlotbookError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SlotbookError);

impl From<InfraError> for SlotbookError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SlotbookError> for InfraError {
    fn from(value: SlotbookError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSlotbookError {
    fn into_slotbook(self) -> SlotbookError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → SlotbookError */
/* -------------------------------------------------------------------------- */

/// SQLITE_CONSTRAINT_UNIQUE
const UNIQUE_VIOLATION: i32 = 2067;
/// SQLITE_CONSTRAINT_PRIMARYKEY
const PRIMARY_KEY_VIOLATION: i32 = 1555;
/// SQLITE_CONSTRAINT_FOREIGNKEY
const FOREIGN_KEY_VIOLATION: i32 = 787;

impl IntoSlotbookError for SqlError {
    fn into_slotbook(self) -> SlotbookError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        SlotbookError::Transient("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        SlotbookError::Transient("database is locked".into())
                    }
                    (ErrorCode::OperationInterrupted, _) => {
                        SlotbookError::Transient("database operation interrupted".into())
                    }
                    (ErrorCode::ConstraintViolation, UNIQUE_VIOLATION | PRIMARY_KEY_VIOLATION) => {
                        SlotbookError::Conflict(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, FOREIGN_KEY_VIOLATION) => {
                        SlotbookError::Database("foreign key constraint violation".into())
                    }
                    _ => SlotbookError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => SlotbookError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                SlotbookError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                SlotbookError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => SlotbookError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => SlotbookError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_slotbook())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → SlotbookError */
/* -------------------------------------------------------------------------- */

impl IntoSlotbookError for r2d2::Error {
    fn into_slotbook(self) -> SlotbookError {
        // r2d2 only reports checkout timeouts through this type
        SlotbookError::Transient(format!("connection pool exhausted: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_slotbook())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → SlotbookError */
/* -------------------------------------------------------------------------- */

impl IntoSlotbookError for JoinError {
    fn into_slotbook(self) -> SlotbookError {
        if self.is_cancelled() {
            SlotbookError::Internal("blocking database task cancelled".into())
        } else {
            SlotbookError::Internal(format!("blocking database task panicked: {self}"))
        }
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        InfraError(value.into_slotbook())
    }
}

/// Shorthand used by repositories: `rusqlite::Error` straight to the domain.
pub fn map_sql_error(err: SqlError) -> SlotbookError {
    SlotbookError::from(InfraError::from(err))
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
