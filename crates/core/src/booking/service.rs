//! Booking service - availability queries and lifecycle transitions

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde_json::json;
use slotbook_domain::constants::MINUTES_PER_DAY;
use slotbook_domain::utils::{
    is_canonical_time, minutes_to_time, normalize_date, normalize_phone, normalize_time,
    parse_canonical_date, time_to_minutes,
};
use slotbook_domain::{
    weekday_index, Booking, BookingStatus, BookingTransition, Cancellation, CancellationActor,
    ClientInfo, Contact, CreateBookingRequest, NotificationRequest, NotificationTemplate, Result,
    Service, SlotbookError, TenantContext, TenantId, WorkWindow,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::availability::{
    format_slots, has_conflict, list_free_slots, suggest_slot, today_cutoff, BookedInterval,
    LocalNow,
};
use crate::ports::{
    BookingRepository, Clock, ContactRepository, NotificationDispatcher, ServiceRepository,
    TenantRepository, WorkingHoursRepository,
};
use crate::tenancy::{retain_all_owned, retain_owned, ResolvedTenant, TenantGuard};

/// Collaborators the booking service talks to.
pub struct BookingPorts {
    pub tenants: Arc<dyn TenantRepository>,
    pub services: Arc<dyn ServiceRepository>,
    pub working_hours: Arc<dyn WorkingHoursRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub notifier: Arc<dyn NotificationDispatcher>,
    pub clock: Arc<dyn Clock>,
}

/// Runtime knobs for [`BookingService`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookingSettings {
    /// Timezone of tenants that do not declare one
    pub default_timezone: Tz,
    /// Upper bound for each persistence call
    pub request_timeout: Duration,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            default_timezone: chrono_tz::America::Sao_Paulo,
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Slot queries, booking creation and lifecycle transitions.
///
/// Every operation starts from a [`TenantContext`] and resolves the tenant
/// before touching tenant-owned rows.
pub struct BookingService {
    guard: TenantGuard,
    working_hours: Arc<dyn WorkingHoursRepository>,
    bookings: Arc<dyn BookingRepository>,
    contacts: Arc<dyn ContactRepository>,
    notifier: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    request_timeout: Duration,
}

impl BookingService {
    /// Wire the service over its ports.
    pub fn new(ports: BookingPorts, settings: BookingSettings) -> Self {
        Self {
            guard: TenantGuard::new(ports.tenants, ports.services, settings.default_timezone),
            working_hours: ports.working_hours,
            bookings: ports.bookings,
            contacts: ports.contacts,
            notifier: ports.notifier,
            clock: ports.clock,
            request_timeout: settings.request_timeout,
        }
    }

    /// Free `HH:MM` starts for a service on a date.
    ///
    /// Closed days and past dates yield an empty list. On the tenant's
    /// current day, slots before the same-day cutoff are hidden.
    #[instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), service_id = %service_id))]
    pub async fn get_available_slots(
        &self,
        ctx: &TenantContext,
        service_id: &str,
        date: &str,
    ) -> Result<Vec<String>> {
        require("service_id", service_id)?;
        require("date", date)?;

        let tenant = self.resolve_tenant(ctx).await?;
        let service = self.resolve_service(tenant.id(), service_id).await?;
        let now = self.local_now(&tenant);
        let date = resolve_date(date, now.date);

        if date < now.date {
            debug!(%date, "no availability for past dates");
            return Ok(Vec::new());
        }
        let Some(window) = self.work_window(tenant.id(), date).await? else {
            debug!(%date, "closed day");
            return Ok(Vec::new());
        };

        let existing = self.booked_intervals(tenant.id(), date).await?;
        let mut slots = list_free_slots(&existing, service.duration_minutes, window);
        if date == now.date {
            let cutoff = today_cutoff(now);
            slots.retain(|&slot| slot >= cutoff);
        }

        Ok(format_slots(&slots))
    }

    /// Next free start at or after `after_time` for a given duration.
    #[instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), duration_minutes = duration_minutes))]
    pub async fn suggest_alternative(
        &self,
        ctx: &TenantContext,
        date: &str,
        duration_minutes: u32,
        after_time: Option<&str>,
    ) -> Result<Option<String>> {
        require("date", date)?;
        if duration_minutes == 0 || duration_minutes > MINUTES_PER_DAY {
            return Err(SlotbookError::Validation(format!(
                "duration must be between 1 and {MINUTES_PER_DAY} minutes"
            )));
        }
        let after = after_time
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                parse_start_time(raw).ok_or_else(|| {
                    SlotbookError::Validation(format!("unrecognized time: {raw}"))
                })
            })
            .transpose()?;

        let tenant = self.resolve_tenant(ctx).await?;
        let now = self.local_now(&tenant);
        let date = resolve_date(date, now.date);

        if date < now.date {
            return Ok(None);
        }
        let Some(window) = self.work_window(tenant.id(), date).await? else {
            return Ok(None);
        };

        let existing = self.booked_intervals(tenant.id(), date).await?;
        Ok(suggest_slot(date, &existing, duration_minutes, window, after, now).map(minutes_to_time))
    }

    /// Create a confirmed booking.
    ///
    /// A request carrying an idempotency key that was already used by this
    /// tenant returns the stored booking unchanged.
    #[instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), service_id = %request.service_id))]
    pub async fn create(&self, ctx: &TenantContext, request: CreateBookingRequest) -> Result<Booking> {
        require("service_id", &request.service_id)?;
        require("date", &request.date)?;
        require("start_time", &request.start_time)?;
        require("client_name", &request.client.name)?;
        require("client_phone", &request.client.phone)?;

        let phone = normalize_phone(&request.client.phone);
        if phone.is_empty() {
            return Err(SlotbookError::Validation("client phone has no digits".to_string()));
        }
        let start = parse_start_time(&request.start_time).ok_or_else(|| {
            SlotbookError::Validation(format!("unrecognized start time: {}", request.start_time))
        })?;
        let idempotency_key =
            request.idempotency_key.as_deref().map(str::trim).filter(|k| !k.is_empty());

        let tenant = self.resolve_tenant(ctx).await?;
        let service = self.resolve_service(tenant.id(), &request.service_id).await?;
        let now = self.local_now(&tenant);
        let date = resolve_date(&request.date, now.date);

        let end = start.saturating_add(service.duration_minutes);
        if end > MINUTES_PER_DAY {
            return Err(SlotbookError::Validation(format!(
                "{} minute service starting at {} runs past midnight",
                service.duration_minutes,
                minutes_to_time(start)
            )));
        }

        if let Some(key) = idempotency_key {
            if let Some(existing) = self.find_by_idempotency_key(tenant.id(), key).await? {
                info!(booking_id = %existing.id, "replaying idempotent create");
                return Ok(existing);
            }
        }

        let existing = self.booked_intervals(tenant.id(), date).await?;
        if has_conflict(start, service.duration_minutes, &existing) {
            return self.replay_or_slot_taken(tenant.id(), idempotency_key, date, start).await;
        }

        let booking = Booking {
            id: Uuid::now_v7().to_string(),
            tenant_id: tenant.id().clone(),
            service_id: service.id.clone(),
            client: ClientInfo {
                name: request.client.name.trim().to_string(),
                phone,
                email: request.client.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            },
            date,
            start_time: minutes_to_time(start),
            end_time: Some(minutes_to_time(end)),
            status: BookingStatus::Confirmed,
            cancellation: None,
            completed_at: None,
            idempotency_key: idempotency_key.map(str::to_string),
            created_at: self.clock.now(),
        };

        // Not wrapped in `bounded`: the store owns this deadline and rolls back past it.
        match self.bookings.insert_confirmed(&booking, self.request_timeout).await {
            Ok(()) => {}
            Err(SlotbookError::Conflict(reason)) => {
                debug!(%reason, "store rejected booking");
                return self.replay_or_slot_taken(tenant.id(), idempotency_key, date, start).await;
            }
            Err(err) => return Err(err),
        }

        info!(booking_id = %booking.id, date = %booking.date, start_time = %booking.start_time, "booking confirmed");

        self.upsert_contact(&booking).await;
        self.notify(&booking, &service, NotificationTemplate::BookingConfirmed).await;

        Ok(booking)
    }

    /// Cancel a confirmed booking on behalf of the professional.
    #[instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), booking_id = %booking_id))]
    pub async fn cancel(
        &self,
        ctx: &TenantContext,
        booking_id: &str,
        reason: Option<String>,
        actor: CancellationActor,
    ) -> Result<()> {
        let tenant = self.resolve_tenant(ctx).await?;
        self.cancel_resolved(&tenant, booking_id, reason, actor).await
    }

    /// Cancel a booking on behalf of the client who made it.
    ///
    /// The booking must belong to both the tenant and the given phone;
    /// anything else is `NotFound`.
    #[instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), booking_id = %booking_id))]
    pub async fn cancel_for_client(
        &self,
        ctx: &TenantContext,
        phone: &str,
        booking_id: &str,
        reason: Option<String>,
    ) -> Result<()> {
        require("phone", phone)?;
        require("booking_id", booking_id)?;

        let tenant = self.resolve_tenant(ctx).await?;
        let booking = self.find_booking(tenant.id(), booking_id).await?;
        if booking.client.phone != normalize_phone(phone) {
            return Err(booking_not_found(booking_id));
        }

        self.cancel_resolved(&tenant, booking_id, reason, CancellationActor::Client).await
    }

    /// Mark a confirmed booking as completed.
    #[instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), booking_id = %booking_id))]
    pub async fn complete(&self, ctx: &TenantContext, booking_id: &str) -> Result<()> {
        let tenant = self.resolve_tenant(ctx).await?;
        let transition = BookingTransition::Complete { completed_at: self.clock.now() };
        self.apply_transition(tenant.id(), booking_id, &transition).await?;
        Ok(())
    }

    /// Record that the client of a confirmed booking did not show up.
    #[instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), booking_id = %booking_id))]
    pub async fn mark_no_show(&self, ctx: &TenantContext, booking_id: &str) -> Result<()> {
        let tenant = self.resolve_tenant(ctx).await?;
        self.apply_transition(tenant.id(), booking_id, &BookingTransition::NoShow).await?;
        Ok(())
    }

    /// One booking of the tenant, in any state.
    pub async fn get_booking(&self, ctx: &TenantContext, booking_id: &str) -> Result<Booking> {
        require("booking_id", booking_id)?;
        let tenant = self.resolve_tenant(ctx).await?;
        self.find_booking(tenant.id(), booking_id).await
    }

    /// Upcoming confirmed bookings of one client, today included.
    pub async fn active_bookings_for_phone(
        &self,
        ctx: &TenantContext,
        phone: &str,
    ) -> Result<Vec<Booking>> {
        let phone = normalize_phone(phone);
        if phone.is_empty() {
            return Err(SlotbookError::missing_field("phone"));
        }

        let tenant = self.resolve_tenant(ctx).await?;
        let today = self.local_now(&tenant).date;
        let rows = self
            .bounded("bookings by phone", self.bookings.active_by_phone(tenant.id(), &phone, today))
            .await?;
        Ok(retain_all_owned(tenant.id(), rows))
    }

    /// A twin request with the same idempotency key may have taken the slot.
    async fn replay_or_slot_taken(
        &self,
        tenant_id: &TenantId,
        idempotency_key: Option<&str>,
        date: NaiveDate,
        start: u32,
    ) -> Result<Booking> {
        if let Some(key) = idempotency_key {
            if let Some(stored) = self.find_by_idempotency_key(tenant_id, key).await? {
                info!(booking_id = %stored.id, "concurrent create resolved by idempotency key");
                return Ok(stored);
            }
        }
        Err(slot_taken(date, start))
    }

    async fn cancel_resolved(
        &self,
        tenant: &ResolvedTenant,
        booking_id: &str,
        reason: Option<String>,
        actor: CancellationActor,
    ) -> Result<()> {
        let transition = BookingTransition::Cancel(Cancellation {
            reason: reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
            actor,
            cancelled_at: self.clock.now(),
        });
        self.apply_transition(tenant.id(), booking_id, &transition).await?;

        // Read back for the recipient; the cancellation itself already stuck.
        match self.bounded("find booking", self.bookings.find_by_id(tenant.id(), booking_id)).await {
            Ok(Some(booking)) => match self.guard.resolve_service(tenant.id(), &booking.service_id).await {
                Ok(service) => self.notify(&booking, &service, NotificationTemplate::BookingCancelled).await,
                Err(err) => warn!(booking_id, error = %err, "skipping cancellation notice"),
            },
            Ok(None) => warn!(booking_id, "cancelled booking vanished before notification"),
            Err(err) => warn!(booking_id, error = %err, "skipping cancellation notice"),
        }
        Ok(())
    }

    /// Conditional update; a miss is explained by re-reading under the tenant.
    async fn apply_transition(
        &self,
        tenant_id: &TenantId,
        booking_id: &str,
        transition: &BookingTransition,
    ) -> Result<()> {
        require("booking_id", booking_id)?;

        let changed = self
            .bounded("transition booking", self.bookings.transition(tenant_id, booking_id, transition))
            .await?;
        if changed > 0 {
            info!(booking_id, status = %transition.target_status(), "booking transitioned");
            return Ok(());
        }

        let current = self.find_booking(tenant_id, booking_id).await?;
        Err(SlotbookError::Conflict(format!(
            "booking {booking_id} is already {} and cannot become {}",
            current.status,
            transition.target_status()
        )))
    }

    async fn resolve_tenant(&self, ctx: &TenantContext) -> Result<ResolvedTenant> {
        self.bounded("resolve tenant", self.guard.resolve_tenant(ctx)).await
    }

    async fn resolve_service(&self, tenant_id: &TenantId, service_id: &str) -> Result<Service> {
        self.bounded("resolve service", self.guard.resolve_service(tenant_id, service_id)).await
    }

    async fn find_booking(&self, tenant_id: &TenantId, booking_id: &str) -> Result<Booking> {
        let row = self.bounded("find booking", self.bookings.find_by_id(tenant_id, booking_id)).await?;
        retain_owned(tenant_id, row).ok_or_else(|| booking_not_found(booking_id))
    }

    async fn find_by_idempotency_key(
        &self,
        tenant_id: &TenantId,
        key: &str,
    ) -> Result<Option<Booking>> {
        let row = self
            .bounded("find by idempotency key", self.bookings.find_by_idempotency_key(tenant_id, key))
            .await?;
        Ok(retain_owned(tenant_id, row))
    }

    async fn work_window(&self, tenant_id: &TenantId, date: NaiveDate) -> Result<Option<WorkWindow>> {
        let hours = self
            .bounded(
                "working hours",
                self.working_hours.find_for_weekday(tenant_id, weekday_index(date)),
            )
            .await?;
        Ok(retain_owned(tenant_id, hours).and_then(|h| h.window()))
    }

    async fn booked_intervals(
        &self,
        tenant_id: &TenantId,
        date: NaiveDate,
    ) -> Result<Vec<BookedInterval>> {
        let rows = self.bounded("confirmed bookings", self.bookings.confirmed_on(tenant_id, date)).await?;
        Ok(retain_all_owned(tenant_id, rows)
            .iter()
            .filter(|booking| booking.is_confirmed())
            .filter_map(|booking| {
                let interval = BookedInterval::from_booking(booking);
                if interval.is_none() {
                    warn!(booking_id = %booking.id, start_time = %booking.start_time, "unreadable booking start");
                }
                interval
            })
            .collect())
    }

    fn local_now(&self, tenant: &ResolvedTenant) -> LocalNow {
        LocalNow::from_utc(self.clock.now(), tenant.timezone)
    }

    async fn upsert_contact(&self, booking: &Booking) {
        let now = self.clock.now();
        let contact = Contact {
            tenant_id: booking.tenant_id.clone(),
            phone: booking.client.phone.clone(),
            name: booking.client.name.clone(),
            email: booking.client.email.clone(),
            created_at: now,
            updated_at: now,
        };
        if let Err(err) = self.bounded("upsert contact", self.contacts.upsert(&contact)).await {
            warn!(booking_id = %booking.id, error = %err, "contact upsert failed");
        }
    }

    async fn notify(&self, booking: &Booking, service: &Service, template: NotificationTemplate) {
        let request = NotificationRequest {
            tenant_id: booking.tenant_id.clone(),
            recipient: booking.client.phone.clone(),
            template,
            data: json!({
                "booking_id": booking.id,
                "client_name": booking.client.name,
                "service_name": service.name,
                "date": booking.date.to_string(),
                "start_time": booking.start_time,
                "end_time": booking.end_time,
                "cancellation_reason": booking.cancellation.as_ref().and_then(|c| c.reason.clone()),
            }),
        };
        if let Err(err) = self.bounded("enqueue notification", self.notifier.enqueue(request)).await {
            warn!(booking_id = %booking.id, %template, error = %err, "notification enqueue failed");
        }
    }

    /// Run a port call under the request timeout; expiry is `Transient`.
    async fn bounded<T>(&self, operation: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(operation, timeout_ms, "persistence call timed out");
                Err(SlotbookError::Transient(format!("{operation} timed out")))
            }
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SlotbookError::missing_field(field));
    }
    Ok(())
}

fn parse_start_time(raw: &str) -> Option<u32> {
    let normalized = normalize_time(raw);
    if !is_canonical_time(&normalized) {
        return None;
    }
    time_to_minutes(&normalized)
}

/// Free-form date to a calendar date; unrecognized input means today.
fn resolve_date(raw: &str, today: NaiveDate) -> NaiveDate {
    let normalized = normalize_date(raw, today);
    parse_canonical_date(&normalized).unwrap_or(today)
}

fn slot_taken(date: NaiveDate, start: u32) -> SlotbookError {
    SlotbookError::Conflict(format!("slot {} on {date} is not available", minutes_to_time(start)))
}

fn booking_not_found(booking_id: &str) -> SlotbookError {
    SlotbookError::NotFound(format!("booking {booking_id}"))
}
