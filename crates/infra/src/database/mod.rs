//! Database implementations

pub mod booking_repository;
pub mod catalog_repository;
pub mod contact_repository;
pub mod manager;
pub mod outbox_repository;

pub use booking_repository::*;
pub use catalog_repository::*;
pub use contact_repository::*;
pub use manager::*;
pub use outbox_repository::*;
