//! Slot availability commands

use serde::{Deserialize, Serialize};
use slotbook_domain::TenantContext;

use super::CommandResult;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AvailableSlotsRequest {
    pub service_id: String,
    /// Any format the date normalizer accepts
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuggestAlternativeRequest {
    pub date: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub after_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionResponse {
    /// `HH:MM`, or `None` when nothing fits that day
    pub start_time: Option<String>,
}

/// Free `HH:MM` starts for a service on a date.
pub async fn get_available_slots(
    ctx: &AppContext,
    tenant: &TenantContext,
    request: AvailableSlotsRequest,
) -> CommandResult<Vec<String>> {
    execute_command("availability::get_available_slots", tenant, || async move {
        ctx.booking_service.get_available_slots(tenant, &request.service_id, &request.date).await
    })
    .await
}

pub async fn suggest_alternative(
    ctx: &AppContext,
    tenant: &TenantContext,
    request: SuggestAlternativeRequest,
) -> CommandResult<SuggestionResponse> {
    execute_command("availability::suggest_alternative", tenant, || async move {
        let start_time = ctx
            .booking_service
            .suggest_alternative(
                tenant,
                &request.date,
                request.duration_minutes,
                request.after_time.as_deref(),
            )
            .await?;
        Ok(SuggestionResponse { start_time })
    })
    .await
}
