//! Port interfaces for the booking engine
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations. Every method touching tenant-owned
//! rows takes the tenant id explicitly and implementations must apply it as
//! a query predicate.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use slotbook_domain::{
    Booking, BookingTransition, Contact, NotificationRequest, Result, Service, Tenant, TenantId,
    WorkingHours,
};

/// Tenant lookup
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_tenant(&self, tenant_id: &TenantId) -> Result<Option<Tenant>>;
}

/// Service lookup, always scoped to the owning tenant
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Find a service by id under `tenant_id`. A service owned by another
    /// tenant yields `Ok(None)`.
    async fn find_service(&self, tenant_id: &TenantId, service_id: &str)
        -> Result<Option<Service>>;
}

/// Weekly schedule lookup
#[async_trait]
pub trait WorkingHoursRepository: Send + Sync {
    /// Entry for `weekday` (0 = Sunday), if the tenant defined one.
    async fn find_for_weekday(
        &self,
        tenant_id: &TenantId,
        weekday: u8,
    ) -> Result<Option<WorkingHours>>;
}

/// Booking persistence
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a booking in `confirmed` state.
    ///
    /// Must fail with `SlotbookError::Conflict` when the store's uniqueness
    /// rules (same tenant/date/start among confirmed rows, or same
    /// idempotency key) reject the row.
    ///
    /// Must give up with `SlotbookError::Transient` once `timeout` elapses,
    /// and any error return guarantees the row was not persisted.
    async fn insert_confirmed(&self, booking: &Booking, timeout: Duration) -> Result<()>;

    /// Confirmed bookings of one tenant on one date.
    async fn confirmed_on(&self, tenant_id: &TenantId, date: NaiveDate) -> Result<Vec<Booking>>;

    async fn find_by_id(&self, tenant_id: &TenantId, booking_id: &str) -> Result<Option<Booking>>;

    async fn find_by_idempotency_key(
        &self,
        tenant_id: &TenantId,
        key: &str,
    ) -> Result<Option<Booking>>;

    /// Confirmed bookings for a normalized phone dated `from_date` or later,
    /// ordered by date then start time.
    async fn active_by_phone(
        &self,
        tenant_id: &TenantId,
        phone: &str,
        from_date: NaiveDate,
    ) -> Result<Vec<Booking>>;

    /// Apply a transition to a confirmed booking of `tenant_id`.
    ///
    /// Returns the number of rows changed (0 or 1).
    async fn transition(
        &self,
        tenant_id: &TenantId,
        booking_id: &str,
        transition: &BookingTransition,
    ) -> Result<usize>;
}

/// Per-tenant contact book
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Insert or refresh the contact keyed by (tenant, phone).
    async fn upsert(&self, contact: &Contact) -> Result<()>;

    async fn find_by_phone(&self, tenant_id: &TenantId, phone: &str) -> Result<Option<Contact>>;
}

/// Outbound message hand-off
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn enqueue(&self, request: NotificationRequest) -> Result<()>;
}

/// Wall clock source
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
