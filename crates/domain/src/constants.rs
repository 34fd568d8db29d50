//! Scheduling constants
//!
//! Centralized location for the fixed booking grain. These values are part of
//! the booking contract offered to clients and are not configurable.

/// Mandatory gap after every booking's end before the next may start.
pub const BUFFER_MINUTES: u32 = 15;

/// Duration assumed for bookings stored without an explicit end time.
pub const LEGACY_BOOKING_MINUTES: u32 = 60;

/// Step between candidate slot starts.
pub const SLOT_STEP_MINUTES: u32 = 60;

/// Minimum lead time before a same-day slot may start.
pub const SAME_DAY_LEAD_MINUTES: u32 = 60;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

