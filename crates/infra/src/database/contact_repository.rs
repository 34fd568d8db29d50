//! SQLite-backed contact book keyed by (tenant, phone).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use rusqlite::{params, OptionalExtension};
use slotbook_core::ports::ContactRepository;
use slotbook_domain::{Contact, Result as DomainResult, TenantId};

use super::manager::{with_connection, DbManager};
use crate::errors::map_sql_error;

/// Per-tenant contact book in the `contacts` table.
pub struct SqliteContactRepository {
    db: Arc<DbManager>,
}

impl SqliteContactRepository {
    /// Repository over the shared pool.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    async fn upsert(&self, contact: &Contact) -> DomainResult<()> {
        let contact = contact.clone();
        with_connection(&self.db, move |conn| {
            conn.execute(
                CONTACT_UPSERT_SQL,
                params![
                    contact.tenant_id.as_str(),
                    contact.phone,
                    contact.name,
                    contact.email,
                    contact.created_at.timestamp_millis(),
                    contact.updated_at.timestamp_millis(),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    async fn find_by_phone(&self, tenant_id: &TenantId, phone: &str) -> DomainResult<Option<Contact>> {
        let tenant_id = tenant_id.clone();
        let phone = phone.to_string();
        with_connection(&self.db, move |conn| {
            conn.query_row(CONTACT_BY_PHONE_SQL, params![tenant_id.as_str(), phone], |row| {
                let created: i64 = row.get(4)?;
                let updated: i64 = row.get(5)?;
                Ok(Contact {
                    tenant_id: TenantId::new(row.get::<_, String>(0)?),
                    phone: row.get(1)?,
                    name: row.get(2)?,
                    email: row.get(3)?,
                    created_at: DateTime::from_timestamp_millis(created)
                        .ok_or(rusqlite::Error::IntegralValueOutOfRange(4, created))?,
                    updated_at: DateTime::from_timestamp_millis(updated)
                        .ok_or(rusqlite::Error::IntegralValueOutOfRange(5, updated))?,
                })
            })
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }
}

// An upsert keeps the first-seen timestamp and a previously known email.
const CONTACT_UPSERT_SQL: &str = "INSERT INTO contacts (
        professional_id, phone, name, email, created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(professional_id, phone) DO UPDATE SET
        name = excluded.name,
        email = COALESCE(excluded.email, contacts.email),
        updated_at = excluded.updated_at";

const CONTACT_BY_PHONE_SQL: &str = "SELECT professional_id, phone, name, email, created_at, updated_at
    FROM contacts
    WHERE professional_id = ?1 AND phone = ?2";
