use crate::common::error::Result;
use crate::database::DatabaseManager;
use crate::domain::EmissionRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::traits::EmissionStore;

/// SQLite-backed implementation of [`EmissionStore`].
pub struct DatabaseStorage {
    db: Arc<DatabaseManager>,
}

impl DatabaseStorage {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<EmissionRecord> {
        let id: String = row.get(0)?;
        let created_at: String = row.get(6)?;

        let id = Uuid::parse_str(&id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    6,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(EmissionRecord {
            id: Some(id),
            company: row.get(1)?,
            scope: row.get(2)?,
            category: row.get(3)?,
            value: row.get(4)?,
            year: row.get(5)?,
            created_at,
        })
    }
}

#[async_trait]
impl EmissionStore for DatabaseStorage {
    async fn insert_records(&self, records: &mut [EmissionRecord]) -> Result<()> {
        let mut conn = self.db.lock()?;
        let tx = conn.transaction()?;

        for record in records.iter_mut() {
            let id = *record.id.get_or_insert_with(Uuid::new_v4);
            tx.execute(
                "INSERT INTO emissions (id, company_name, scope, category, value, year, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id.to_string(),
                    record.company,
                    record.scope,
                    record.category,
                    record.value,
                    record.year,
                    record.created_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Inserted {} emission records", records.len());
        Ok(())
    }

    async fn all_records(&self) -> Result<Vec<EmissionRecord>> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, company_name, scope, category, value, year, created_at
             FROM emissions
             ORDER BY company_name, rowid",
        )?;

        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Fetched {} emission records", records.len());
        Ok(records)
    }

    async fn delete_all(&self) -> Result<usize> {
        let conn = self.db.lock()?;
        let deleted = conn.execute("DELETE FROM emissions", [])?;
        debug!("Deleted {} emission records", deleted);
        Ok(deleted)
    }
}
