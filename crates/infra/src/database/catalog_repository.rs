//! SQLite-backed tenant catalog: tenants, their services and weekly hours.
//!
//! Implements the three read ports the booking service resolves before any
//! scheduling work. The write helpers exist for provisioning; every lookup
//! of a tenant-owned row filters on `professional_id`.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use slotbook_core::ports::{ServiceRepository, TenantRepository, WorkingHoursRepository};
use slotbook_domain::{
    LocationMode, Result as DomainResult, Service, SlotbookError, Tenant, TenantId, WorkingHours,
};
use tracing::warn;

use super::manager::{with_connection, DbManager};
use crate::errors::map_sql_error;

/// SQLite repository for tenants, services and working hours.
pub struct SqliteCatalogRepository {
    db: Arc<DbManager>,
}

impl SqliteCatalogRepository {
    /// Repository over the shared pool.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace a tenant record.
    pub async fn save_tenant(&self, tenant: &Tenant) -> DomainResult<()> {
        let tenant = tenant.clone();
        with_connection(&self.db, move |conn| {
            conn.execute(TENANT_UPSERT_SQL, params![tenant.id.as_str(), tenant.name, tenant.timezone])
                .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    /// Insert or replace a service under its owning tenant.
    ///
    /// A service id already owned by another tenant is `NotFound` and left
    /// untouched.
    pub async fn save_service(&self, service: &Service) -> DomainResult<()> {
        let service = service.clone();
        with_connection(&self.db, move |conn| {
            let changed = conn.execute(
                SERVICE_UPSERT_SQL,
                params![
                    service.id,
                    service.tenant_id.as_str(),
                    service.name,
                    service.duration_minutes,
                    service.active,
                    service.location_mode.to_string(),
                ],
            )
            .map_err(map_sql_error)?;
            if changed == 0 {
                warn!(
                    service_id = %service.id,
                    tenant_id = %service.tenant_id,
                    "service id belongs to another tenant"
                );
                return Err(SlotbookError::NotFound(format!("service {}", service.id)));
            }
            Ok(())
        })
        .await
    }

    /// Insert or replace one weekday of a tenant's schedule.
    pub async fn save_working_hours(&self, hours: &WorkingHours) -> DomainResult<()> {
        let hours = hours.clone();
        with_connection(&self.db, move |conn| {
            conn.execute(
                HOURS_UPSERT_SQL,
                params![
                    hours.tenant_id.as_str(),
                    hours.weekday,
                    hours.start_time,
                    hours.end_time,
                    hours.available,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl TenantRepository for SqliteCatalogRepository {
    async fn find_tenant(&self, tenant_id: &TenantId) -> DomainResult<Option<Tenant>> {
        let tenant_id = tenant_id.clone();
        with_connection(&self.db, move |conn| {
            conn.query_row(TENANT_BY_ID_SQL, params![tenant_id.as_str()], |row| {
                Ok(Tenant {
                    id: TenantId::new(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    timezone: row.get(2)?,
                })
            })
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }
}

#[async_trait]
impl ServiceRepository for SqliteCatalogRepository {
    async fn find_service(
        &self,
        tenant_id: &TenantId,
        service_id: &str,
    ) -> DomainResult<Option<Service>> {
        let tenant_id = tenant_id.clone();
        let service_id = service_id.to_string();
        with_connection(&self.db, move |conn| {
            conn.query_row(SERVICE_BY_ID_SQL, params![service_id, tenant_id.as_str()], map_service_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
    }
}

#[async_trait]
impl WorkingHoursRepository for SqliteCatalogRepository {
    async fn find_for_weekday(
        &self,
        tenant_id: &TenantId,
        weekday: u8,
    ) -> DomainResult<Option<WorkingHours>> {
        let tenant_id = tenant_id.clone();
        with_connection(&self.db, move |conn| {
            conn.query_row(HOURS_BY_WEEKDAY_SQL, params![tenant_id.as_str(), weekday], |row| {
                Ok(WorkingHours {
                    tenant_id: TenantId::new(row.get::<_, String>(0)?),
                    weekday: row.get(1)?,
                    start_time: row.get(2)?,
                    end_time: row.get(3)?,
                    available: row.get(4)?,
                })
            })
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }
}

const TENANT_UPSERT_SQL: &str = "INSERT INTO tenants (id, name, timezone) VALUES (?1, ?2, ?3)
    ON CONFLICT(id) DO UPDATE SET name = excluded.name, timezone = excluded.timezone";

const TENANT_BY_ID_SQL: &str = "SELECT id, name, timezone FROM tenants WHERE id = ?1";

const SERVICE_UPSERT_SQL: &str = "INSERT INTO services (
        id, professional_id, name, duration_minutes, active, location_mode
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        duration_minutes = excluded.duration_minutes,
        active = excluded.active,
        location_mode = excluded.location_mode
    WHERE services.professional_id = excluded.professional_id";

const SERVICE_BY_ID_SQL: &str = "SELECT id, professional_id, name, duration_minutes, active, location_mode
    FROM services
    WHERE id = ?1 AND professional_id = ?2";

const HOURS_UPSERT_SQL: &str = "INSERT INTO working_hours (
        professional_id, weekday, start_time, end_time, available
    ) VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(professional_id, weekday) DO UPDATE SET
        start_time = excluded.start_time,
        end_time = excluded.end_time,
        available = excluded.available";

const HOURS_BY_WEEKDAY_SQL: &str = "SELECT professional_id, weekday, start_time, end_time, available
    FROM working_hours
    WHERE professional_id = ?1 AND weekday = ?2";

fn map_service_row(row: &Row<'_>) -> rusqlite::Result<Service> {
    let id: String = row.get(0)?;
    let mode_raw: String = row.get(5)?;
    let location_mode = mode_raw.parse::<LocationMode>().unwrap_or_else(|err| {
        warn!(
            service_id = %id,
            raw_mode = %mode_raw,
            error = %err,
            "invalid location mode stored, defaulting to in_salon"
        );
        LocationMode::InSalon
    });

    Ok(Service {
        id,
        tenant_id: TenantId::new(row.get::<_, String>(1)?),
        name: row.get(2)?,
        duration_minutes: row.get(3)?,
        active: row.get(4)?,
        location_mode,
    })
}
