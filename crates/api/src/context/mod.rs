//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use slotbook_core::{BookingPorts, BookingService, BookingSettings, Clock};
use slotbook_domain::{Config, Result, SlotbookError};
use slotbook_infra::{
    config, DbManager, InfraError, SqliteBookingRepository, SqliteCatalogRepository,
    SqliteContactRepository, SqliteOutboxRepository, SystemClock,
};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    /// Provisioning access to tenants, services and working hours
    pub catalog: Arc<SqliteCatalogRepository>,
    /// Drained by the external delivery worker
    pub outbox: Arc<SqliteOutboxRepository>,
    pub booking_service: Arc<BookingService>,
}

impl AppContext {
    /// Create a context from `.env`, environment variables or a config file.
    pub async fn new() -> Result<Self> {
        load_dotenv();
        let config = config::load()?;
        Self::new_with_config(config).await
    }

    /// Create a new application context with custom configuration
    ///
    /// Tests use this to point at a temporary database.
    pub async fn new_with_config(config: Config) -> Result<Self> {
        Self::new_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Create a context whose booking service reads time from `clock`.
    pub async fn new_with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let config = config::validate(config)?;
        let default_timezone = config::default_timezone(&config)?;

        let db_config = config.database.clone();
        let db = tokio::task::spawn_blocking(move || {
            let db = DbManager::from_config(&db_config)?;
            db.run_migrations()?;
            Ok::<_, SlotbookError>(db)
        })
        .await
        .map_err(|err| SlotbookError::from(InfraError::from(err)))??;
        let db = Arc::new(db);

        let catalog = Arc::new(SqliteCatalogRepository::new(db.clone()));
        let outbox = Arc::new(SqliteOutboxRepository::new(db.clone()));

        let booking_service = Arc::new(BookingService::new(
            BookingPorts {
                tenants: catalog.clone(),
                services: catalog.clone(),
                working_hours: catalog.clone(),
                bookings: Arc::new(SqliteBookingRepository::new(db.clone())),
                contacts: Arc::new(SqliteContactRepository::new(db.clone())),
                notifier: outbox.clone(),
                clock,
            },
            BookingSettings {
                default_timezone,
                request_timeout: Duration::from_millis(config.scheduling.request_timeout_ms),
            },
        ));

        tracing::info!(
            db_path = %db.path().display(),
            default_timezone = %default_timezone,
            request_timeout_ms = config.scheduling.request_timeout_ms,
            "application context ready"
        );

        Ok(Self { config, db, catalog, outbox, booking_service })
    }

    /// Verify the database answers.
    pub async fn health_check(&self) -> Result<()> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || db.health_check())
            .await
            .map_err(|err| SlotbookError::from(InfraError::from(err)))?
    }
}

fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "failed to read .env file"),
    }
}
