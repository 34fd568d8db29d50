//! Slot availability calculator
//!
//! Pure functions over one (tenant, date, service) triple. Every time value
//! is expressed in minutes since local midnight; callers convert with
//! [`time_to_minutes`](slotbook_domain::utils::time_to_minutes) and
//! [`minutes_to_time`] at the edges.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use slotbook_domain::constants::{
    BUFFER_MINUTES, LEGACY_BOOKING_MINUTES, SAME_DAY_LEAD_MINUTES, SLOT_STEP_MINUTES,
};
use slotbook_domain::utils::temporal::minutes_to_time;
use slotbook_domain::{Booking, WorkWindow};

/// Occupied span of an existing confirmed booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedInterval {
    /// Start in minutes since local midnight
    pub start: u32,
    /// `None` for legacy rows stored without an end time
    pub end: Option<u32>,
}

impl BookedInterval {
    /// Interval from minute offsets.
    pub fn new(start: u32, end: Option<u32>) -> Self {
        Self { start, end }
    }

    /// Interval of a stored booking, or `None` if its start time is unreadable.
    pub fn from_booking(booking: &Booking) -> Option<Self> {
        Some(Self { start: booking.start_minutes()?, end: booking.end_minutes() })
    }

    /// End of the blocked span, buffer included.
    pub fn effective_end(&self) -> u32 {
        self.end
            .unwrap_or_else(|| self.start.saturating_add(LEGACY_BOOKING_MINUTES))
            .saturating_add(BUFFER_MINUTES)
    }

    fn overlaps(&self, candidate_start: u32, duration: u32) -> bool {
        candidate_start < self.effective_end()
            && candidate_start.saturating_add(duration) > self.start
    }
}

/// Current date and time of day in a tenant's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalNow {
    /// Local calendar date
    pub date: NaiveDate,
    /// Minutes since local midnight
    pub minutes: u32,
}

impl LocalNow {
    /// Local date and minute of day, as given.
    pub fn new(date: NaiveDate, minutes: u32) -> Self {
        Self { date, minutes }
    }

    /// Project a UTC instant onto the tenant's wall clock.
    pub fn from_utc(now: DateTime<Utc>, tz: Tz) -> Self {
        let local = now.with_timezone(&tz);
        Self { date: local.date_naive(), minutes: local.hour() * 60 + local.minute() }
    }
}

/// Whether a candidate slot collides with any existing booking.
///
/// The buffer only extends the end of existing bookings: a candidate may
/// finish exactly when the next booking starts.
pub fn has_conflict(candidate_start: u32, duration: u32, existing: &[BookedInterval]) -> bool {
    existing.iter().any(|booked| booked.overlaps(candidate_start, duration))
}

/// Earliest start allowed for a same-day booking.
///
/// The next full hour at least one hour past the current local time.
pub fn today_cutoff(now: LocalNow) -> u32 {
    now.minutes
        .saturating_add(SAME_DAY_LEAD_MINUTES)
        .div_ceil(SLOT_STEP_MINUTES)
        .saturating_mul(SLOT_STEP_MINUTES)
}

/// Slot starts from `from` whose service still ends inside the window.
fn candidates(from: u32, duration: u32, work_end: u32) -> impl Iterator<Item = u32> {
    (from..work_end)
        .step_by(SLOT_STEP_MINUTES as usize)
        .take_while(move |start| start.checked_add(duration).is_some_and(|end| end <= work_end))
}

/// Next free slot at or after `after_time` on `date`.
///
/// Returns `None` when nothing fits, including when the duration alone
/// exceeds the work window.
pub fn suggest_slot(
    date: NaiveDate,
    existing: &[BookedInterval],
    duration: u32,
    window: WorkWindow,
    after_time: Option<u32>,
    now: LocalNow,
) -> Option<u32> {
    let mut lower_bound = window.start.max(after_time.unwrap_or(window.start));
    if date == now.date {
        lower_bound = lower_bound.max(today_cutoff(now));
    }

    candidates(lower_bound, duration, window.end)
        .find(|&candidate| !has_conflict(candidate, duration, existing))
}

/// Every free slot of the day, in order.
pub fn list_free_slots(existing: &[BookedInterval], duration: u32, window: WorkWindow) -> Vec<u32> {
    candidates(window.start, duration, window.end)
        .filter(|&candidate| !has_conflict(candidate, duration, existing))
        .collect()
}

/// Format a list of slot starts as `HH:MM` strings.
pub fn format_slots(slots: &[u32]) -> Vec<String> {
    slots.iter().map(|&minutes| minutes_to_time(minutes)).collect()
}
