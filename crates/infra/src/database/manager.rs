//! Database connection manager backed by an r2d2 SQLite pool.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, InterruptHandle, Transaction, TransactionBehavior};
use slotbook_domain::{DatabaseConfig, Result, SlotbookError};
use tokio::task;
use tracing::{info, warn};

use crate::errors::{map_sql_error, InfraError};

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

pub type SqlitePool = Pool<SqliteConnectionManager>;
pub type SqliteConnection = PooledConnection<SqliteConnectionManager>;

/// Database manager that wraps an [`SqlitePool`].
pub struct DbManager {
    pool: SqlitePool,
    path: PathBuf,
    busy_timeout: Duration,
}

impl DbManager {
    /// Create a new manager with the given pool size.
    ///
    /// Every pooled connection runs in WAL mode with foreign keys enforced
    /// and waits up to `busy_timeout` for a competing writer. The same value
    /// bounds how long a caller waits for a free connection.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32, busy_timeout: Duration) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();

        let manager = SqliteConnectionManager::file(&path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .connection_timeout(busy_timeout)
            .build(manager)
            .map_err(|err| SlotbookError::Database(format!("failed to open database pool: {err}")))?;

        info!(
            db_path = %path.display(),
            max_connections = pool.max_size(),
            "sqlite pool initialised"
        );

        Ok(Self { pool, path, busy_timeout })
    }

    /// Build a manager from the database section of the configuration.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::new(&config.path, config.pool_size, Duration::from_millis(config.busy_timeout_ms))
    }

    /// Borrow the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<SqliteConnection> {
        self.pool.get().map_err(|err| InfraError::from(err).into())
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        create_schema(&conn)?;
        Ok(())
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How long a connection waits on a competing writer.
    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }

    /// Perform a health check to verify database connectivity.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0)).map_err(map_sql_error)?;
        Ok(())
    }
}

/// Run blocking rusqlite work on a pooled connection off the async runtime.
pub async fn with_connection<T, F>(db: &Arc<DbManager>, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> Result<T> + Send + 'static,
{
    let db = Arc::clone(db);
    task::spawn_blocking(move || {
        let conn = db.get_connection()?;
        work(&conn)
    })
    .await
    .map_err(|err| SlotbookError::from(InfraError::from(err)))?
}

/// Run a write inside an immediate transaction that commits only while the
/// caller is still waiting for it.
///
/// Once `timeout` elapses the caller gets `Transient` and the transaction is
/// rolled back, whether SQLite is still waiting on a lock or the statements
/// already ran. A write that reached `COMMIT` before the deadline is awaited
/// and its outcome returned as is.
pub async fn with_write_deadline<T, F>(db: &Arc<DbManager>, timeout: Duration, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> Result<T> + Send + 'static,
{
    let deadline = Instant::now() + timeout;
    let attempt = Arc::new(WriteAttempt::default());

    let mut handle = {
        let db = Arc::clone(db);
        let attempt = Arc::clone(&attempt);
        task::spawn_blocking(move || attempt.run(&db, deadline, work))
    };

    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(joined) => joined.map_err(|err| SlotbookError::from(InfraError::from(err)))?,
        Err(_) if attempt.abandon() => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(timeout_ms, "write abandoned at deadline");
            Err(write_timed_out())
        }
        // The worker claimed the commit first; its outcome stands.
        Err(_) => handle.await.map_err(|err| SlotbookError::from(InfraError::from(err)))?,
    }
}

const PENDING: u8 = 0;
const COMMITTING: u8 = 1;
const ABANDONED: u8 = 2;

/// Commit-or-abandon handshake between an async caller and its blocking write.
#[derive(Default)]
struct WriteAttempt {
    state: AtomicU8,
    interrupt: Mutex<Option<InterruptHandle>>,
}

impl WriteAttempt {
    /// Caller side: give up unless the worker already claimed the commit.
    fn abandon(&self) -> bool {
        let abandoned = self
            .state
            .compare_exchange(PENDING, ABANDONED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if abandoned {
            if let Some(handle) = self.interrupt_slot().as_ref() {
                handle.interrupt();
            }
        }
        abandoned
    }

    /// Worker side: claim the commit unless the caller already gave up.
    fn claim_commit(&self) -> bool {
        self.state
            .compare_exchange(PENDING, COMMITTING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn is_abandoned(&self) -> bool {
        self.state.load(Ordering::Acquire) == ABANDONED
    }

    fn interrupt_slot(&self) -> MutexGuard<'_, Option<InterruptHandle>> {
        self.interrupt.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run<T, F>(&self, db: &DbManager, deadline: Instant, work: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T>,
    {
        let conn = db.get_connection()?;
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || self.is_abandoned() {
            return Err(write_timed_out());
        }

        // Handle is cleared before the connection goes back to the pool.
        *self.interrupt_slot() = Some(conn.get_interrupt_handle());
        let result = self.commit_if_wanted(&conn, remaining.min(db.busy_timeout()), work);
        self.interrupt_slot().take();

        if !conn.is_autocommit() {
            warn!("write transaction left open, rolling back");
            if let Err(err) = conn.execute_batch("ROLLBACK") {
                warn!(error = %err, "rollback failed");
            }
        }
        if let Err(err) = conn.busy_timeout(db.busy_timeout()) {
            warn!(error = %err, "failed to restore busy timeout");
        }
        result
    }

    fn commit_if_wanted<T, F>(&self, conn: &rusqlite::Connection, busy: Duration, work: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T>,
    {
        conn.busy_timeout(busy).map_err(map_sql_error)?;
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
            .map_err(map_sql_error)?;
        let value = work(&tx)?;
        if !self.claim_commit() {
            // Dropping `tx` rolls the write back.
            return Err(write_timed_out());
        }
        tx.commit().map_err(map_sql_error)?;
        Ok(value)
    }
}

fn write_timed_out() -> SlotbookError {
    SlotbookError::Transient("write timed out".into())
}

fn create_schema(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?, CAST(strftime('%s','now') AS INTEGER))",
        params![SCHEMA_VERSION],
    )
    .map_err(map_sql_error)?;
    Ok(())
}
