//! # SlotBook Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The slot availability calculator
//! - The tenant isolation guard
//! - Port/adapter interfaces (traits)
//! - The booking lifecycle service
//!
//! ## Architecture Principles
//! - Only depends on `slotbook-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod availability;
pub mod booking;
pub mod ports;
pub mod tenancy;

// Re-export specific items to avoid ambiguity
pub use availability::{has_conflict, list_free_slots, suggest_slot, today_cutoff, BookedInterval, LocalNow};
pub use booking::{BookingPorts, BookingService, BookingSettings};
pub use ports::{
    BookingRepository, Clock, ContactRepository, NotificationDispatcher, ServiceRepository,
    TenantRepository, WorkingHoursRepository,
};
pub use tenancy::{ResolvedTenant, TenantGuard};
