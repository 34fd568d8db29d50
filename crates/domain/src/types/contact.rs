//! Per-tenant client contacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tenant::{TenantId, TenantOwned};

/// Contact record, unique per (tenant, phone).
///
/// Two tenants may hold a contact with the same phone; the records are
/// unrelated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub tenant_id: TenantId,
    /// Digits only, see [`crate::utils::normalize_phone`]
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantOwned for Contact {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}
