//! Infrastructure error handling

pub mod conversions;

pub use conversions::{map_sql_error, InfraError};
