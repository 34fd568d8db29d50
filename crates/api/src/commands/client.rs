//! Commands a client runs against their own bookings.
//!
//! The client is identified by phone number within the tenant; a booking
//! that exists but carries another phone is reported as not found.

use serde::Deserialize;
use slotbook_domain::{Booking, TenantContext};

use super::CommandResult;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MyBookingsRequest {
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CancelMyBookingRequest {
    pub phone: String,
    pub booking_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Upcoming confirmed bookings for a phone number, soonest first.
pub async fn my_bookings(
    ctx: &AppContext,
    tenant: &TenantContext,
    request: MyBookingsRequest,
) -> CommandResult<Vec<Booking>> {
    execute_command("client::my_bookings", tenant, || async move {
        ctx.booking_service.active_bookings_for_phone(tenant, &request.phone).await
    })
    .await
}

pub async fn cancel_my_booking(
    ctx: &AppContext,
    tenant: &TenantContext,
    request: CancelMyBookingRequest,
) -> CommandResult<()> {
    execute_command("client::cancel_my_booking", tenant, || async move {
        ctx.booking_service
            .cancel_for_client(tenant, &request.phone, &request.booking_id, request.reason)
            .await
    })
    .await
}
