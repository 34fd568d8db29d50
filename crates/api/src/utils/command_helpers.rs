//! Command execution helpers
//!
//! Every command runs through [`execute_command`] so timing, logging and
//! the error mapping stay identical across the surface.

use std::future::Future;
use std::time::Instant;

use slotbook_domain::{Result as DomainResult, TenantContext};

use crate::commands::{CommandError, CommandResult};
use crate::logging::log_command_execution;

/// Run a command body, log its outcome and convert the error.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn get_booking(ctx: &AppContext, tenant: &TenantContext, id: &str) -> CommandResult<Booking> {
///     execute_command("bookings::get_booking", tenant, || async {
///         ctx.booking_service.get_booking(tenant, id).await
///     })
///     .await
/// }
/// ```
pub async fn execute_command<F, Fut, T>(
    command_name: &str,
    tenant: &TenantContext,
    command_fn: F,
) -> CommandResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command_fn().await;

    log_command_execution(
        command_name,
        tenant.tenant_id().as_str(),
        start.elapsed(),
        result.as_ref().err(),
    );

    result.map_err(CommandError::from)
}
