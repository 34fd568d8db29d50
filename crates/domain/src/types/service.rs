//! Bookable services offered by a tenant.

use serde::{Deserialize, Serialize};

use super::tenant::{TenantId, TenantOwned};
use crate::constants::MINUTES_PER_DAY;
use crate::impl_domain_status_conversions;

/// Where a service is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMode {
    InSalon,
    AtHome,
    Both,
}

impl_domain_status_conversions!(LocationMode {
    InSalon => "in_salon",
    AtHome => "at_home",
    Both => "both",
});

/// Service record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub tenant_id: TenantId,
    pub name: String,
    pub duration_minutes: u32,
    pub active: bool,
    pub location_mode: LocationMode,
}

impl Service {
    /// A service can only be booked while active and with a duration that
    /// fits in a single day.
    pub fn is_bookable(&self) -> bool {
        self.active && (1..=MINUTES_PER_DAY).contains(&self.duration_minutes)
    }
}

impl TenantOwned for Service {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(active: bool, duration_minutes: u32) -> Service {
        Service {
            id: "svc-1".into(),
            tenant_id: TenantId::new("pro-1"),
            name: "Haircut".into(),
            duration_minutes,
            active,
            location_mode: LocationMode::InSalon,
        }
    }

    #[test]
    fn inactive_or_zero_length_services_are_not_bookable() {
        assert!(service(true, 45).is_bookable());
        assert!(!service(false, 45).is_bookable());
        assert!(!service(true, 0).is_bookable());
    }

    #[test]
    fn services_longer_than_a_day_are_not_bookable() {
        assert!(service(true, MINUTES_PER_DAY).is_bookable());
        assert!(!service(true, MINUTES_PER_DAY + 1).is_bookable());
        assert!(!service(true, u32::MAX).is_bookable());
    }

    #[test]
    fn location_mode_round_trips_through_storage_text() {
        assert_eq!(LocationMode::AtHome.to_string(), "at_home");
        assert_eq!("in_salon".parse::<LocationMode>(), Ok(LocationMode::InSalon));
    }
}
