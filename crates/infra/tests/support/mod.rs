//! Shared fixtures for `slotbook-infra` integration tests.
//!
//! Every test gets its own SQLite file inside a [`TempDir`] that lives as
//! long as the fixture, with the schema already applied and two tenants
//! provisioned.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use slotbook_core::{BookingPorts, BookingService, BookingSettings, Clock};
use slotbook_domain::{LocationMode, Service, Tenant, TenantId, WorkingHours};
use slotbook_infra::{
    DbManager, SqliteBookingRepository, SqliteCatalogRepository, SqliteContactRepository,
    SqliteOutboxRepository,
};
use tempfile::TempDir;

/// Clock frozen at a settable instant.
#[derive(Clone)]
pub struct FixedClock(Arc<Mutex<DateTime<Utc>>>);

impl FixedClock {
    pub fn at(rfc3339: &str) -> Self {
        Self(Arc::new(Mutex::new(parse(rfc3339))))
    }

    pub fn set(&self, rfc3339: &str) {
        *self.0.lock().unwrap() = parse(rfc3339);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

fn parse(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

/// Temporary database wired into a full booking service.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    pub catalog: Arc<SqliteCatalogRepository>,
    pub bookings: Arc<SqliteBookingRepository>,
    pub contacts: Arc<SqliteContactRepository>,
    pub outbox: Arc<SqliteOutboxRepository>,
    pub clock: FixedClock,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Fresh schema with tenants `pro-a` (Sao Paulo) and `pro-b` (no
    /// timezone), both open 09:00-18:00 Monday to Friday.
    pub async fn new(now: &str) -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager = DbManager::new(temp_dir.path().join("slotbook.db"), 8, Duration::from_secs(5))
            .expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");
        let manager = Arc::new(manager);

        let db = Self {
            catalog: Arc::new(SqliteCatalogRepository::new(manager.clone())),
            bookings: Arc::new(SqliteBookingRepository::new(manager.clone())),
            contacts: Arc::new(SqliteContactRepository::new(manager.clone())),
            outbox: Arc::new(SqliteOutboxRepository::new(manager.clone())),
            manager,
            clock: FixedClock::at(now),
            _temp_dir: temp_dir,
        };

        db.add_tenant("pro-a", Some("America/Sao_Paulo")).await;
        db.add_tenant("pro-b", None).await;
        for tenant in ["pro-a", "pro-b"] {
            for weekday in 1..=5 {
                db.catalog
                    .save_working_hours(&WorkingHours {
                        tenant_id: TenantId::new(tenant),
                        weekday,
                        start_time: "09:00".into(),
                        end_time: "18:00".into(),
                        available: true,
                    })
                    .await
                    .expect("hours saved");
            }
        }
        db
    }

    pub async fn add_tenant(&self, id: &str, timezone: Option<&str>) {
        self.catalog
            .save_tenant(&Tenant {
                id: TenantId::new(id),
                name: id.to_string(),
                timezone: timezone.map(str::to_string),
            })
            .await
            .expect("tenant saved");
    }

    pub async fn add_service(&self, tenant: &str, id: &str, duration_minutes: u32) {
        self.catalog
            .save_service(&Service {
                id: id.to_string(),
                tenant_id: TenantId::new(tenant),
                name: format!("Service {id}"),
                duration_minutes,
                active: true,
                location_mode: LocationMode::InSalon,
            })
            .await
            .expect("service saved");
    }

    /// Booking service over the SQLite adapters.
    pub fn service(&self) -> BookingService {
        self.service_with_timeout(Duration::from_secs(10))
    }

    pub fn service_with_timeout(&self, request_timeout: Duration) -> BookingService {
        BookingService::new(
            BookingPorts {
                tenants: self.catalog.clone(),
                services: self.catalog.clone(),
                working_hours: self.catalog.clone(),
                bookings: self.bookings.clone(),
                contacts: self.contacts.clone(),
                notifier: self.outbox.clone(),
                clock: Arc::new(self.clock.clone()),
            },
            BookingSettings {
                default_timezone: chrono_tz::America::Sao_Paulo,
                request_timeout,
            },
        )
    }

    /// Take the database write lock on a separate connection and keep it
    /// for `hold`. Returns once the lock is held.
    pub async fn hold_write_lock(&self, hold: Duration) -> tokio::task::JoinHandle<()> {
        let path = self.manager.path().to_path_buf();
        let (locked_tx, locked_rx) = tokio::sync::oneshot::channel();
        let holder = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(path).expect("lock connection opens");
            conn.execute_batch("BEGIN IMMEDIATE").expect("write lock taken");
            let _ = locked_tx.send(());
            std::thread::sleep(hold);
            conn.execute_batch("COMMIT").expect("write lock released");
        });
        locked_rx.await.expect("lock holder started");
        holder
    }

    pub fn execute_batch(&self, sql: &str) {
        let conn = self.manager.get_connection().expect("connection available");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }

    pub fn count(&self, sql: &str) -> i64 {
        let conn = self.manager.get_connection().expect("connection available");
        conn.query_row(sql, [], |row| row.get(0)).expect("count query")
    }
}
