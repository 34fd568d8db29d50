//! Notification requests handed to the external delivery channel.
//!
//! The engine only enqueues; a separate worker drains the outbox and talks to
//! the messaging provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tenant::{TenantId, TenantOwned};

/// Message templates understood by the delivery worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    BookingConfirmed,
    BookingCancelled,
}

crate::impl_domain_status_conversions!(NotificationTemplate {
    BookingConfirmed => "booking_confirmed",
    BookingCancelled => "booking_cancelled",
});

/// A fire-and-forget message for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub tenant_id: TenantId,
    pub recipient: String,
    pub template: NotificationTemplate,
    pub data: Value,
}

impl TenantOwned for NotificationRequest {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    Pending,
    Sent,
    Failed,
}

crate::impl_domain_status_conversions!(OutboxStatus {
    Pending => "pending",
    Sent => "sent",
    Failed => "failed",
});

/// Persisted outbox row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationOutboxEntry {
    pub id: String,
    pub tenant_id: TenantId,
    pub recipient: String,
    pub template: NotificationTemplate,
    pub payload_json: String,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub sent_at: Option<i64>,
}
