//! # SlotBook API
//!
//! Application layer - commands and dependency wiring.
//!
//! This crate contains:
//! - Commands invoked by the conversational tool layer
//! - Application context (dependency injection)
//! - Logging initialisation
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Converts domain errors into serializable [`CommandError`]s

pub mod commands;
pub mod context;
pub mod logging;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
