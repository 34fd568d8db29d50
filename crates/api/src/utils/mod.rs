//! Helpers shared by command implementations.

pub mod command_helpers;
