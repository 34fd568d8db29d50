//! Booking lifecycle commands used by the professional.

use serde::Deserialize;
use slotbook_domain::{Booking, CancellationActor, CreateBookingRequest, TenantContext};

use super::CommandResult;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookingIdRequest {
    pub booking_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CancelBookingRequest {
    pub booking_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Create a confirmed booking.
///
/// A repeated `idempotency_key` returns the booking created the first time.
pub async fn create_booking(
    ctx: &AppContext,
    tenant: &TenantContext,
    request: CreateBookingRequest,
) -> CommandResult<Booking> {
    execute_command("bookings::create_booking", tenant, || async move {
        ctx.booking_service.create(tenant, request).await
    })
    .await
}

pub async fn get_booking(
    ctx: &AppContext,
    tenant: &TenantContext,
    request: BookingIdRequest,
) -> CommandResult<Booking> {
    execute_command("bookings::get_booking", tenant, || async move {
        ctx.booking_service.get_booking(tenant, &request.booking_id).await
    })
    .await
}

/// Cancel on behalf of the professional.
pub async fn cancel_booking(
    ctx: &AppContext,
    tenant: &TenantContext,
    request: CancelBookingRequest,
) -> CommandResult<()> {
    execute_command("bookings::cancel_booking", tenant, || async move {
        ctx.booking_service
            .cancel(tenant, &request.booking_id, request.reason, CancellationActor::Professional)
            .await
    })
    .await
}

pub async fn complete_booking(
    ctx: &AppContext,
    tenant: &TenantContext,
    request: BookingIdRequest,
) -> CommandResult<()> {
    execute_command("bookings::complete_booking", tenant, || async move {
        ctx.booking_service.complete(tenant, &request.booking_id).await
    })
    .await
}

pub async fn mark_no_show(
    ctx: &AppContext,
    tenant: &TenantContext,
    request: BookingIdRequest,
) -> CommandResult<()> {
    execute_command("bookings::mark_no_show", tenant, || async move {
        ctx.booking_service.mark_no_show(tenant, &request.booking_id).await
    })
    .await
}
