//! # SlotBook Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories over an r2d2 connection pool
//! - The notification outbox
//! - Configuration loading
//! - The system clock
//!
//! ## Architecture
//! - Implements traits defined in `slotbook-core`
//! - Depends on `slotbook-domain` and `slotbook-core`
//! - Contains all "impure" code (I/O, environment, time)

pub mod clock;
pub mod config;
pub mod database;
pub mod errors;

// Re-export commonly used items
pub use clock::SystemClock;
pub use database::*;
pub use errors::InfraError;
