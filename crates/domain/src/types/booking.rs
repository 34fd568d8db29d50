//! Booking records and their lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::tenant::{TenantId, TenantOwned};
use crate::impl_domain_status_conversions;
use crate::utils::temporal::time_to_minutes;

/// Lifecycle state of a booking.
///
/// `Confirmed` is the only entry state; the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl_domain_status_conversions!(BookingStatus {
    Confirmed => "confirmed",
    Cancelled => "cancelled",
    Completed => "completed",
    NoShow => "no_show",
});

impl BookingStatus {
    /// Whether no further transition is allowed out of this state.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Confirmed)
    }
}

/// Who cancelled a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationActor {
    Client,
    Professional,
    System,
}

impl_domain_status_conversions!(CancellationActor {
    Client => "client",
    Professional => "professional",
    System => "system",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub reason: Option<String>,
    pub actor: CancellationActor,
    pub cancelled_at: DateTime<Utc>,
}

/// Client identity captured with a booking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Booking record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub tenant_id: TenantId,
    pub service_id: String,
    pub client: ClientInfo,
    pub date: NaiveDate,
    /// Canonical `HH:MM`
    pub start_time: String,
    /// Canonical `HH:MM`; absent on rows created before end times were stored
    pub end_time: Option<String>,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<Cancellation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn start_minutes(&self) -> Option<u32> {
        time_to_minutes(&self.start_time)
    }

    pub fn end_minutes(&self) -> Option<u32> {
        self.end_time.as_deref().and_then(time_to_minutes)
    }

    /// Confirmed bookings are the only ones that occupy a slot.
    pub fn is_confirmed(&self) -> bool {
        !self.status.is_terminal()
    }
}

impl TenantOwned for Booking {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// Raw create-booking input as received from the public page or the bot.
///
/// Date and time are free-form and normalized by the booking service. The
/// tenant is intentionally absent: it comes from the trusted context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub service_id: String,
    pub date: String,
    pub start_time: String,
    pub client: ClientInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

/// A state change applied by a tenant-guarded conditional update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingTransition {
    Cancel(Cancellation),
    Complete { completed_at: DateTime<Utc> },
    NoShow,
}

impl BookingTransition {
    pub fn target_status(&self) -> BookingStatus {
        match self {
            Self::Cancel(_) => BookingStatus::Cancelled,
            Self::Complete { .. } => BookingStatus::Completed,
            Self::NoShow => BookingStatus::NoShow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_confirmed_bookings_can_move() {
        use BookingStatus::*;
        assert!(!Confirmed.is_terminal());
        for terminal in [Cancelled, Completed, NoShow] {
            assert!(terminal.is_terminal());
        }
    }

    #[test]
    fn status_text_matches_storage_values() {
        assert_eq!(BookingStatus::NoShow.to_string(), "no_show");
        assert_eq!("cancelled".parse::<BookingStatus>(), Ok(BookingStatus::Cancelled));
        assert!("deleted".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn transition_targets() {
        let cancel = BookingTransition::Cancel(Cancellation {
            reason: None,
            actor: CancellationActor::Client,
            cancelled_at: Utc::now(),
        });
        assert_eq!(cancel.target_status(), BookingStatus::Cancelled);
        assert_eq!(BookingTransition::NoShow.target_status(), BookingStatus::NoShow);
    }
}
