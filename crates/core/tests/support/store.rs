use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use slotbook_core::ports::{
    BookingRepository, ContactRepository, NotificationDispatcher, ServiceRepository,
    TenantRepository, WorkingHoursRepository,
};
use slotbook_domain::{
    Booking, BookingStatus, BookingTransition, Contact, LocationMode, NotificationRequest,
    Result as DomainResult, Service, SlotbookError, Tenant, TenantId, WorkingHours,
};

#[derive(Default)]
struct State {
    tenants: Vec<Tenant>,
    services: Vec<Service>,
    hours: Vec<WorkingHours>,
    bookings: Vec<Booking>,
    contacts: Vec<Contact>,
    notifications: Vec<NotificationRequest>,
}

/// In-memory implementation of every core port.
///
/// Reads and conditional updates filter on the tenant id, and inserts
/// reject a second confirmed booking for the same (tenant, date, start) or
/// a reused idempotency key, mirroring the SQLite unique indexes.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    insert_delay: Option<Duration>,
    read_delay: Option<Duration>,
    fail_notifications: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep before committing inserts so concurrent creates both pass the
    /// conflict check and race on the uniqueness rule.
    pub fn with_insert_delay(mut self, delay: Duration) -> Self {
        self.insert_delay = Some(delay);
        self
    }

    /// Sleep before answering booking reads.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn failing_notifications(mut self) -> Self {
        self.fail_notifications = true;
        self
    }

    pub fn add_tenant(&self, id: &str, timezone: Option<&str>) -> &Self {
        self.state.lock().unwrap().tenants.push(Tenant {
            id: TenantId::new(id),
            name: format!("Studio {id}"),
            timezone: timezone.map(str::to_string),
        });
        self
    }

    pub fn add_service(&self, tenant: &str, id: &str, duration_minutes: u32, active: bool) -> &Self {
        self.state.lock().unwrap().services.push(Service {
            id: id.into(),
            tenant_id: TenantId::new(tenant),
            name: format!("Service {id}"),
            duration_minutes,
            active,
            location_mode: LocationMode::InSalon,
        });
        self
    }

    /// Open Monday to Friday with the given hours.
    pub fn add_weekday_hours(&self, tenant: &str, start: &str, end: &str) -> &Self {
        let mut state = self.state.lock().unwrap();
        for weekday in 1..=5 {
            state.hours.push(WorkingHours {
                tenant_id: TenantId::new(tenant),
                weekday,
                start_time: start.into(),
                end_time: end.into(),
                available: true,
            });
        }
        self
    }

    /// Seed a row directly, bypassing uniqueness checks.
    pub fn seed_booking(&self, booking: Booking) -> &Self {
        self.state.lock().unwrap().bookings.push(booking);
        self
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.state.lock().unwrap().bookings.clone()
    }

    pub fn contacts(&self) -> Vec<Contact> {
        self.state.lock().unwrap().contacts.clone()
    }

    pub fn notifications(&self) -> Vec<NotificationRequest> {
        self.state.lock().unwrap().notifications.clone()
    }

    async fn pause(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl TenantRepository for InMemoryStore {
    async fn find_tenant(&self, tenant_id: &TenantId) -> DomainResult<Option<Tenant>> {
        Ok(self.state.lock().unwrap().tenants.iter().find(|t| &t.id == tenant_id).cloned())
    }
}

#[async_trait]
impl ServiceRepository for InMemoryStore {
    async fn find_service(
        &self,
        tenant_id: &TenantId,
        service_id: &str,
    ) -> DomainResult<Option<Service>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .services
            .iter()
            .find(|s| s.id == service_id && &s.tenant_id == tenant_id)
            .cloned())
    }
}

#[async_trait]
impl WorkingHoursRepository for InMemoryStore {
    async fn find_for_weekday(
        &self,
        tenant_id: &TenantId,
        weekday: u8,
    ) -> DomainResult<Option<WorkingHours>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .hours
            .iter()
            .find(|h| &h.tenant_id == tenant_id && h.weekday == weekday)
            .cloned())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert_confirmed(&self, booking: &Booking, timeout: Duration) -> DomainResult<()> {
        if tokio::time::timeout(timeout, Self::pause(self.insert_delay)).await.is_err() {
            return Err(SlotbookError::Transient("insert timed out".into()));
        }
        let mut state = self.state.lock().unwrap();

        let slot_taken = state.bookings.iter().any(|b| {
            b.tenant_id == booking.tenant_id
                && b.is_confirmed()
                && b.date == booking.date
                && b.start_time == booking.start_time
        });
        let key_reused = booking.idempotency_key.is_some()
            && state.bookings.iter().any(|b| {
                b.tenant_id == booking.tenant_id && b.idempotency_key == booking.idempotency_key
            });
        if slot_taken || key_reused {
            return Err(SlotbookError::Conflict("UNIQUE constraint failed".into()));
        }

        state.bookings.push(booking.clone());
        Ok(())
    }

    async fn confirmed_on(
        &self,
        tenant_id: &TenantId,
        date: NaiveDate,
    ) -> DomainResult<Vec<Booking>> {
        Self::pause(self.read_delay).await;
        Ok(self
            .state
            .lock()
            .unwrap()
            .bookings
            .iter()
            .filter(|b| &b.tenant_id == tenant_id && b.date == date && b.is_confirmed())
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        tenant_id: &TenantId,
        booking_id: &str,
    ) -> DomainResult<Option<Booking>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .bookings
            .iter()
            .find(|b| b.id == booking_id && &b.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_by_idempotency_key(
        &self,
        tenant_id: &TenantId,
        key: &str,
    ) -> DomainResult<Option<Booking>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .bookings
            .iter()
            .find(|b| &b.tenant_id == tenant_id && b.idempotency_key.as_deref() == Some(key))
            .cloned())
    }

    async fn active_by_phone(
        &self,
        tenant_id: &TenantId,
        phone: &str,
        from_date: NaiveDate,
    ) -> DomainResult<Vec<Booking>> {
        let mut rows: Vec<Booking> = self
            .state
            .lock()
            .unwrap()
            .bookings
            .iter()
            .filter(|b| {
                &b.tenant_id == tenant_id
                    && b.client.phone == phone
                    && b.is_confirmed()
                    && b.date >= from_date
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.date, &a.start_time).cmp(&(b.date, &b.start_time)));
        Ok(rows)
    }

    async fn transition(
        &self,
        tenant_id: &TenantId,
        booking_id: &str,
        transition: &BookingTransition,
    ) -> DomainResult<usize> {
        let mut state = self.state.lock().unwrap();
        let Some(booking) = state.bookings.iter_mut().find(|b| {
            b.id == booking_id && &b.tenant_id == tenant_id && b.status == BookingStatus::Confirmed
        }) else {
            return Ok(0);
        };

        booking.status = transition.target_status();
        match transition {
            BookingTransition::Cancel(cancellation) => {
                booking.cancellation = Some(cancellation.clone());
            }
            BookingTransition::Complete { completed_at } => {
                booking.completed_at = Some(*completed_at);
            }
            BookingTransition::NoShow => {}
        }
        Ok(1)
    }
}

#[async_trait]
impl ContactRepository for InMemoryStore {
    async fn upsert(&self, contact: &Contact) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        match state
            .contacts
            .iter_mut()
            .find(|c| c.tenant_id == contact.tenant_id && c.phone == contact.phone)
        {
            Some(existing) => {
                existing.name = contact.name.clone();
                existing.email = contact.email.clone().or(existing.email.take());
                existing.updated_at = contact.updated_at;
            }
            None => state.contacts.push(contact.clone()),
        }
        Ok(())
    }

    async fn find_by_phone(
        &self,
        tenant_id: &TenantId,
        phone: &str,
    ) -> DomainResult<Option<Contact>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .contacts
            .iter()
            .find(|c| &c.tenant_id == tenant_id && c.phone == phone)
            .cloned())
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryStore {
    async fn enqueue(&self, request: NotificationRequest) -> DomainResult<()> {
        if self.fail_notifications {
            return Err(SlotbookError::Transient("outbox unavailable".into()));
        }
        self.state.lock().unwrap().notifications.push(request);
        Ok(())
    }
}
