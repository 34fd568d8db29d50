//! SQLite-backed implementation of the `BookingRepository` port.
//!
//! Concurrency safety for a slot comes from the partial unique index on
//! `(professional_id, date, start_time) WHERE status = 'confirmed'`; a
//! rejected insert surfaces as `SlotbookError::Conflict`. Status changes are
//! single-row conditional updates that include the tenant and the
//! `confirmed` state in their predicate.
//!
//! Inserts run under a write deadline: past it the transaction rolls back
//! and the caller sees `Transient`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row, ToSql};
use slotbook_core::ports::BookingRepository;
use slotbook_domain::{
    Booking, BookingStatus, BookingTransition, Cancellation, CancellationActor, ClientInfo,
    Result as DomainResult, TenantId,
};
use tracing::warn;

use super::manager::{with_connection, with_write_deadline, DbManager};
use crate::errors::map_sql_error;

/// `SELECT <all booking columns> FROM bookings <tail>`
macro_rules! select_bookings {
    ($tail:literal) => {
        concat!(
            "SELECT id, professional_id, service_id, client_name, client_phone, client_email,
                date, start_time, end_time, status, cancellation_reason, cancelled_by,
                cancelled_at, completed_at, idempotency_key, created_at
            FROM bookings ",
            $tail
        )
    };
}

/// Booking rows in the `bookings` table.
pub struct SqliteBookingRepository {
    db: Arc<DbManager>,
}

impl SqliteBookingRepository {
    /// Repository over the shared pool.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn query(&self, sql: &'static str, args: Vec<String>) -> DomainResult<Vec<Booking>> {
        with_connection(&self.db, move |conn| {
            let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
            let params: Vec<&dyn ToSql> = args.iter().map(|arg| arg as &dyn ToSql).collect();
            let rows = stmt
                .query_map(params.as_slice(), map_booking_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
    }

    async fn query_one(&self, sql: &'static str, args: Vec<String>) -> DomainResult<Option<Booking>> {
        with_connection(&self.db, move |conn| {
            let params: Vec<&dyn ToSql> = args.iter().map(|arg| arg as &dyn ToSql).collect();
            conn.query_row(sql, params.as_slice(), map_booking_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    async fn insert_confirmed(&self, booking: &Booking, timeout: Duration) -> DomainResult<()> {
        let booking = booking.clone();
        with_write_deadline(&self.db, timeout, move |conn| {
            conn.execute(
                BOOKING_INSERT_SQL,
                params![
                    booking.id,
                    booking.tenant_id.as_str(),
                    booking.service_id,
                    booking.client.name,
                    booking.client.phone,
                    booking.client.email,
                    booking.date.to_string(),
                    booking.start_time,
                    booking.end_time,
                    booking.idempotency_key,
                    booking.created_at.timestamp_millis(),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    async fn confirmed_on(&self, tenant_id: &TenantId, date: NaiveDate) -> DomainResult<Vec<Booking>> {
        self.query(CONFIRMED_ON_DATE_SQL, vec![tenant_id.to_string(), date.to_string()]).await
    }

    async fn find_by_id(&self, tenant_id: &TenantId, booking_id: &str) -> DomainResult<Option<Booking>> {
        self.query_one(BOOKING_BY_ID_SQL, vec![booking_id.to_string(), tenant_id.to_string()]).await
    }

    async fn find_by_idempotency_key(
        &self,
        tenant_id: &TenantId,
        key: &str,
    ) -> DomainResult<Option<Booking>> {
        self.query_one(BOOKING_BY_KEY_SQL, vec![tenant_id.to_string(), key.to_string()]).await
    }

    async fn active_by_phone(
        &self,
        tenant_id: &TenantId,
        phone: &str,
        from_date: NaiveDate,
    ) -> DomainResult<Vec<Booking>> {
        self.query(
            ACTIVE_BY_PHONE_SQL,
            vec![tenant_id.to_string(), phone.to_string(), from_date.to_string()],
        )
        .await
    }

    async fn transition(
        &self,
        tenant_id: &TenantId,
        booking_id: &str,
        transition: &BookingTransition,
    ) -> DomainResult<usize> {
        let tenant_id = tenant_id.clone();
        let booking_id = booking_id.to_string();
        let transition = transition.clone();

        with_connection(&self.db, move |conn| {
            let changed = match &transition {
                BookingTransition::Cancel(cancellation) => conn.execute(
                    CANCEL_SQL,
                    params![
                        cancellation.reason,
                        cancellation.actor.to_string(),
                        cancellation.cancelled_at.timestamp_millis(),
                        booking_id,
                        tenant_id.as_str(),
                    ],
                ),
                BookingTransition::Complete { completed_at } => conn.execute(
                    COMPLETE_SQL,
                    params![completed_at.timestamp_millis(), booking_id, tenant_id.as_str()],
                ),
                BookingTransition::NoShow => {
                    conn.execute(NO_SHOW_SQL, params![booking_id, tenant_id.as_str()])
                }
            }
            .map_err(map_sql_error)?;
            Ok(changed)
        })
        .await
    }
}

const BOOKING_INSERT_SQL: &str = "INSERT INTO bookings (
        id, professional_id, service_id, client_name, client_phone, client_email,
        date, start_time, end_time, status, idempotency_key, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'confirmed', ?10, ?11)";

const CONFIRMED_ON_DATE_SQL: &str = select_bookings!(
    "WHERE professional_id = ?1 AND date = ?2 AND status = 'confirmed' ORDER BY start_time"
);

const BOOKING_BY_ID_SQL: &str = select_bookings!("WHERE id = ?1 AND professional_id = ?2");

const BOOKING_BY_KEY_SQL: &str =
    select_bookings!("WHERE professional_id = ?1 AND idempotency_key = ?2");

const ACTIVE_BY_PHONE_SQL: &str = select_bookings!(
    "WHERE professional_id = ?1 AND client_phone = ?2 AND date >= ?3 AND status = 'confirmed'
    ORDER BY date, start_time"
);

const CANCEL_SQL: &str = "UPDATE bookings
    SET status = 'cancelled', cancellation_reason = ?1, cancelled_by = ?2, cancelled_at = ?3
    WHERE id = ?4 AND professional_id = ?5 AND status = 'confirmed'";

const COMPLETE_SQL: &str = "UPDATE bookings
    SET status = 'completed', completed_at = ?1
    WHERE id = ?2 AND professional_id = ?3 AND status = 'confirmed'";

const NO_SHOW_SQL: &str = "UPDATE bookings
    SET status = 'no_show'
    WHERE id = ?1 AND professional_id = ?2 AND status = 'confirmed'";

fn map_booking_row(row: &Row<'_>) -> rusqlite::Result<Booking> {
    let id: String = row.get(0)?;
    let date_raw: String = row.get(6)?;
    let date = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d")
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(err)))?;

    let status_raw: String = row.get(9)?;
    let status = status_raw.parse::<BookingStatus>().unwrap_or_else(|err| {
        warn!(
            booking_id = %id,
            raw_status = %status_raw,
            error = %err,
            "invalid booking status stored, treating as cancelled"
        );
        BookingStatus::Cancelled
    });

    let cancelled_at: Option<i64> = row.get(12)?;
    let cancellation = match cancelled_at {
        Some(millis) => {
            let actor_raw: Option<String> = row.get(11)?;
            Some(Cancellation {
                reason: row.get(10)?,
                actor: actor_raw
                    .and_then(|raw| raw.parse::<CancellationActor>().ok())
                    .unwrap_or(CancellationActor::System),
                cancelled_at: millis_to_utc(12, millis)?,
            })
        }
        None => None,
    };

    let completed_at = row.get::<_, Option<i64>>(13)?.map(|m| millis_to_utc(13, m)).transpose()?;

    Ok(Booking {
        id,
        tenant_id: TenantId::new(row.get::<_, String>(1)?),
        service_id: row.get(2)?,
        client: ClientInfo { name: row.get(3)?, phone: row.get(4)?, email: row.get(5)? },
        date,
        start_time: row.get(7)?,
        end_time: row.get(8)?,
        status,
        cancellation,
        completed_at,
        idempotency_key: row.get(14)?,
        created_at: millis_to_utc(15, row.get(15)?)?,
    })
}

fn millis_to_utc(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}
