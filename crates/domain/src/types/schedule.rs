//! Weekly working hours.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::tenant::{TenantId, TenantOwned};
use crate::utils::temporal::time_to_minutes;

/// One weekday entry of a tenant's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub tenant_id: TenantId,
    /// 0 = Sunday … 6 = Saturday
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
    pub available: bool,
}

/// Open interval of a working day, in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkWindow {
    pub start: u32,
    pub end: u32,
}

impl WorkingHours {
    /// The day's window, or `None` when the day is closed.
    ///
    /// Entries flagged unavailable, with unparseable times, or with an end
    /// that does not come after the start are all treated as closed.
    pub fn window(&self) -> Option<WorkWindow> {
        if !self.available {
            return None;
        }
        let start = time_to_minutes(&self.start_time)?;
        let end = time_to_minutes(&self.end_time)?;
        (end > start).then_some(WorkWindow { start, end })
    }
}

impl TenantOwned for WorkingHours {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// Schedule weekday index (0 = Sunday) for a calendar date.
pub fn weekday_index(date: NaiveDate) -> u8 {
    // num_days_from_sunday is always < 7
    date.weekday().num_days_from_sunday() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(start: &str, end: &str, available: bool) -> WorkingHours {
        WorkingHours {
            tenant_id: TenantId::new("pro-1"),
            weekday: 1,
            start_time: start.into(),
            end_time: end.into(),
            available,
        }
    }

    #[test]
    fn open_day_exposes_window_in_minutes() {
        assert_eq!(hours("09:00", "18:00", true).window(), Some(WorkWindow { start: 540, end: 1080 }));
    }

    #[test]
    fn closed_or_inverted_days_have_no_window() {
        assert_eq!(hours("09:00", "18:00", false).window(), None);
        assert_eq!(hours("18:00", "09:00", true).window(), None);
        assert_eq!(hours("9h", "18:00", true).window(), None);
    }

    #[test]
    fn weekday_index_starts_on_sunday() {
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(weekday_index(sunday), 0);
        assert_eq!(weekday_index(saturday), 6);
    }
}
