//! Tenant identity and the trusted context every scoped operation carries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a tenant (a professional account).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Context carried with every scoped operation.
///
/// It is built by the authenticated entry point (session, bot webhook
/// routing) and never deserialized from a request body, so a client cannot
/// choose the tenant it acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    /// Build a context from an identity the caller has already authenticated.
    pub fn from_trusted(tenant_id: impl Into<String>) -> Self {
        Self { tenant_id: TenantId::new(tenant_id) }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// Any row that belongs to exactly one tenant.
pub trait TenantOwned {
    fn tenant_id(&self) -> &TenantId;

    fn is_owned_by(&self, tenant: &TenantId) -> bool {
        self.tenant_id() == tenant
    }
}

/// Tenant (professional) record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    /// IANA timezone name; `None` means the configured default applies.
    pub timezone: Option<String>,
}
