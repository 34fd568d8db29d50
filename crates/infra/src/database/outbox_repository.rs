//! SQLite-backed notification outbox.
//!
//! The booking service only enqueues. An external delivery worker drains
//! pending rows with [`SqliteOutboxRepository::dequeue_batch`] and reports
//! back through `mark_sent` / `mark_failed`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Row};
use slotbook_core::ports::NotificationDispatcher;
use slotbook_domain::{
    NotificationOutboxEntry, NotificationRequest, NotificationTemplate, OutboxStatus,
    Result as DomainResult, SlotbookError, TenantId,
};
use tracing::{debug, warn};
use uuid::Uuid;

use super::manager::{with_connection, DbManager};
use crate::errors::map_sql_error;

/// Delivery attempts before a row is parked as `failed`.
pub const MAX_DELIVERY_ATTEMPTS: i32 = 5;

/// SQLite-backed outbox repository.
pub struct SqliteOutboxRepository {
    db: Arc<DbManager>,
}

impl SqliteOutboxRepository {
    /// Construct a repository backed by the shared manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Oldest pending entries first.
    pub async fn dequeue_batch(&self, limit: usize) -> DomainResult<Vec<NotificationOutboxEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let limit = usize_to_i64(limit);
        with_connection(&self.db, move |conn| {
            let mut stmt = conn.prepare(OUTBOX_DEQUEUE_SQL).map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![limit], map_outbox_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
    }

    pub async fn mark_sent(&self, id: &str) -> DomainResult<()> {
        let id = id.to_string();
        with_connection(&self.db, move |conn| {
            let changed = conn
                .execute(OUTBOX_MARK_SENT_SQL, params![Utc::now().timestamp(), id])
                .map_err(map_sql_error)?;
            require_pending_row(changed, &id)
        })
        .await
    }

    /// Record a failed delivery; the row stays pending until it runs out of
    /// attempts.
    pub async fn mark_failed(&self, id: &str, error: &str) -> DomainResult<()> {
        let id = id.to_string();
        let error = error.to_string();
        with_connection(&self.db, move |conn| {
            let changed = conn
                .execute(OUTBOX_MARK_FAILED_SQL, params![error, MAX_DELIVERY_ATTEMPTS, id])
                .map_err(map_sql_error)?;
            require_pending_row(changed, &id)
        })
        .await
    }
}

#[async_trait]
impl NotificationDispatcher for SqliteOutboxRepository {
    async fn enqueue(&self, request: NotificationRequest) -> DomainResult<()> {
        let payload_json = serde_json::to_string(&request.data)
            .map_err(|err| SlotbookError::Internal(format!("unserializable payload: {err}")))?;
        let id = Uuid::now_v7().to_string();

        debug!(
            tenant_id = %request.tenant_id,
            template = %request.template,
            outbox_id = %id,
            "enqueueing notification"
        );

        with_connection(&self.db, move |conn| {
            conn.execute(
                OUTBOX_INSERT_SQL,
                params![
                    id,
                    request.tenant_id.as_str(),
                    request.recipient,
                    request.template.to_string(),
                    payload_json,
                    Utc::now().timestamp(),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }
}

const OUTBOX_INSERT_SQL: &str = "INSERT INTO notification_outbox (
        id, professional_id, recipient, template, payload_json, status, attempts, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', 0, ?6)";

const OUTBOX_DEQUEUE_SQL: &str = "SELECT
        id, professional_id, recipient, template, payload_json, status, attempts, last_error,
        created_at, sent_at
    FROM notification_outbox
    WHERE status = 'pending'
    ORDER BY created_at ASC, id ASC
    LIMIT ?1";

const OUTBOX_MARK_SENT_SQL: &str = "UPDATE notification_outbox
    SET status = 'sent', sent_at = ?1, last_error = NULL
    WHERE id = ?2 AND status = 'pending'";

const OUTBOX_MARK_FAILED_SQL: &str = "UPDATE notification_outbox
    SET attempts = attempts + 1,
        last_error = ?1,
        status = CASE WHEN attempts + 1 >= ?2 THEN 'failed' ELSE 'pending' END
    WHERE id = ?3 AND status = 'pending'";

fn require_pending_row(changed: usize, id: &str) -> DomainResult<()> {
    if changed == 0 {
        return Err(SlotbookError::NotFound(format!("pending outbox entry {id}")));
    }
    Ok(())
}

fn map_outbox_row(row: &Row<'_>) -> rusqlite::Result<NotificationOutboxEntry> {
    let id: String = row.get(0)?;
    let template_raw: String = row.get(3)?;
    let status_raw: String = row.get(5)?;

    let template = template_raw.parse::<NotificationTemplate>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, err.into())
    })?;

    Ok(NotificationOutboxEntry {
        status: parse_status(&id, &status_raw),
        id,
        tenant_id: TenantId::new(row.get::<_, String>(1)?),
        recipient: row.get(2)?,
        template,
        payload_json: row.get(4)?,
        attempts: row.get(6)?,
        last_error: row.get(7)?,
        created_at: row.get(8)?,
        sent_at: row.get(9)?,
    })
}

fn parse_status(id: &str, raw: &str) -> OutboxStatus {
    match raw.parse::<OutboxStatus>() {
        Ok(status) => status,
        Err(err) => {
            warn!(
                entry_id = %id,
                raw_status = %raw,
                error = %err,
                "invalid outbox status returned by sqlite, defaulting to pending"
            );
            OutboxStatus::Pending
        }
    }
}

fn usize_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
