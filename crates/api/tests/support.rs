//! Shared fixtures for command tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use slotbook_api::AppContext;
use slotbook_core::Clock;
use slotbook_domain::{
    Config, DatabaseConfig, LocationMode, Service, Tenant, TenantContext, TenantId, WorkingHours,
};
use tempfile::TempDir;

/// 09:00 on Wednesday 2025-03-19 in Sao Paulo.
pub const NOW: &str = "2025-03-19T12:00:00Z";

struct PinnedClock(DateTime<Utc>);

impl Clock for PinnedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Application context over a throwaway database.
pub struct TestApp {
    pub ctx: AppContext,
    _temp_dir: TempDir,
}

impl TestApp {
    /// Tenants `salon-a` and `salon-b`, each with a 60 minute `cut` service
    /// (`cut-a`, `cut-b`) and 09:00-18:00 weekday hours.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let config = Config {
            database: DatabaseConfig {
                path: temp_dir.path().join("slotbook.db").to_string_lossy().to_string(),
                pool_size: 4,
                busy_timeout_ms: 2_000,
            },
            ..Config::default()
        };
        let now = DateTime::parse_from_rfc3339(NOW).unwrap().with_timezone(&Utc);
        let ctx = AppContext::new_with_clock(config, Arc::new(PinnedClock(now)))
            .await
            .expect("context builds");

        for (tenant, service) in [("salon-a", "cut-a"), ("salon-b", "cut-b")] {
            ctx.catalog
                .save_tenant(&Tenant {
                    id: TenantId::new(tenant),
                    name: tenant.into(),
                    timezone: Some("America/Sao_Paulo".into()),
                })
                .await
                .unwrap();
            ctx.catalog
                .save_service(&Service {
                    id: service.into(),
                    tenant_id: TenantId::new(tenant),
                    name: "Corte".into(),
                    duration_minutes: 60,
                    active: true,
                    location_mode: LocationMode::Both,
                })
                .await
                .unwrap();
            for weekday in 1..=5 {
                ctx.catalog
                    .save_working_hours(&WorkingHours {
                        tenant_id: TenantId::new(tenant),
                        weekday,
                        start_time: "09:00".into(),
                        end_time: "18:00".into(),
                        available: true,
                    })
                    .await
                    .unwrap();
            }
        }

        Self { ctx, _temp_dir: temp_dir }
    }
}

pub fn tenant(id: &str) -> TenantContext {
    TenantContext::from_trusted(id)
}
