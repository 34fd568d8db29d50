//! # SlotBook Domain
//!
//! Business domain types and models for the booking engine.
//!
//! This crate contains:
//! - Tenant, service, schedule, booking, contact and notification types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Scheduling constants and the date/time normalizer
//!
//! ## Architecture
//! - No dependencies on other SlotBook crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
