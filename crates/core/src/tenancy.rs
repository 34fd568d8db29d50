//! Tenant isolation guard
//!
//! Resolves tenants and their foreign references before any scoped work
//! happens, and filters repository output so a row owned by another tenant
//! is never surfaced even if an adapter forgets its predicate.

use std::sync::Arc;

use chrono_tz::Tz;
use slotbook_domain::{Result, Service, SlotbookError, Tenant, TenantContext, TenantId, TenantOwned};
use tracing::warn;

use crate::ports::{ServiceRepository, TenantRepository};

/// Tenant and the timezone its wall clock runs on.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTenant {
    /// Stored tenant record
    pub tenant: Tenant,
    /// Declared timezone, or the default when missing or unparseable
    pub timezone: Tz,
}

impl ResolvedTenant {
    /// Id to scope every follow-up query with.
    pub fn id(&self) -> &TenantId {
        &self.tenant.id
    }
}

/// Gatekeeper for tenant and service lookups.
pub struct TenantGuard {
    tenants: Arc<dyn TenantRepository>,
    services: Arc<dyn ServiceRepository>,
    default_timezone: Tz,
}

impl TenantGuard {
    /// Guard over the given lookups; `default_timezone` covers tenants without one.
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        services: Arc<dyn ServiceRepository>,
        default_timezone: Tz,
    ) -> Self {
        Self { tenants, services, default_timezone }
    }

    /// Look up the tenant named by the trusted context.
    ///
    /// A blank tenant id is a `Validation` error and an unknown one is
    /// `NotFound`. A tenant whose stored
    /// timezone does not parse runs on the default timezone.
    pub async fn resolve_tenant(&self, ctx: &TenantContext) -> Result<ResolvedTenant> {
        let tenant_id = ctx.tenant_id();
        if tenant_id.is_blank() {
            return Err(SlotbookError::missing_field("tenant_id"));
        }

        let tenant = self
            .tenants
            .find_tenant(tenant_id)
            .await?
            .ok_or_else(|| SlotbookError::NotFound(format!("tenant {tenant_id}")))?;

        let timezone = match tenant.timezone.as_deref() {
            None => self.default_timezone,
            Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
                warn!(tenant_id = %tenant.id, timezone = name, "unknown tenant timezone, using default");
                self.default_timezone
            }),
        };

        Ok(ResolvedTenant { tenant, timezone })
    }

    /// Resolve a bookable service of `tenant_id`.
    ///
    /// Missing, foreign and unbookable services all produce the same
    /// `NotFound`.
    pub async fn resolve_service(&self, tenant_id: &TenantId, service_id: &str) -> Result<Service> {
        let not_found = || SlotbookError::NotFound(format!("service {service_id}"));

        let service = self.services.find_service(tenant_id, service_id).await?.ok_or_else(not_found)?;
        let service = retain_owned(tenant_id, Some(service)).ok_or_else(not_found)?;

        if !service.is_bookable() {
            return Err(not_found());
        }
        Ok(service)
    }
}

/// Drop a row that is not owned by `tenant_id`.
pub fn retain_owned<T: TenantOwned>(tenant_id: &TenantId, row: Option<T>) -> Option<T> {
    row.filter(|row| owned_or_warn(tenant_id, row))
}

/// Drop every row that is not owned by `tenant_id`.
pub fn retain_all_owned<T: TenantOwned>(tenant_id: &TenantId, rows: Vec<T>) -> Vec<T> {
    rows.into_iter().filter(|row| owned_or_warn(tenant_id, row)).collect()
}

fn owned_or_warn<T: TenantOwned>(tenant_id: &TenantId, row: &T) -> bool {
    let owned = row.is_owned_by(tenant_id);
    if !owned {
        warn!(
            requesting_tenant = %tenant_id,
            row_tenant = %row.tenant_id(),
            "dropping row owned by another tenant"
        );
    }
    owned
}
