//! # SQLite Record Store
//!
//! `RecordStore` over the `records` table. Each table the cache names is a
//! `collection`; each record is one JSON document in the `data` column.
//!
//! ## Query Shape
//! ```text
//! load_all   SELECT data FROM records WHERE collection = ? ORDER BY rowid
//! insert     INSERT INTO records (collection, id, data, ...)
//! update     BEGIN; SELECT data ...; merge; UPDATE ... ; COMMIT
//! remove     DELETE FROM records WHERE collection = ? AND id = ?
//! ```
//!
//! Queries are built at runtime (`sqlx::query`) so the crate builds without
//! a live database or offline query data.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::Row;
use tracing::{debug, instrument};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::store::{merge_patch, record_id, Record, RecordStore};

/// SQLite-backed record store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

fn decode(data: &str) -> DbResult<Record> {
    match serde_json::from_str::<Value>(data)? {
        Value::Object(map) => Ok(map),
        other => Err(DbError::Serialization(format!(
            "expected a JSON object, found {}",
            other
        ))),
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    #[instrument(skip(self))]
    async fn load_all(&self, table: &str) -> DbResult<Vec<Record>> {
        let rows = sqlx::query("SELECT data FROM records WHERE collection = ? ORDER BY rowid")
            .bind(table)
            .fetch_all(self.db.pool())
            .await?;

        let records = rows
            .iter()
            .map(|row| {
                let data: String = row.try_get("data")?;
                decode(&data)
            })
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = records.len(), "Loaded records");
        Ok(records)
    }

    #[instrument(skip(self, record))]
    async fn insert(&self, table: &str, record: Record) -> DbResult<Record> {
        let id = record_id(table, &record)?.to_string();
        let data = serde_json::to_string(&record)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO records (collection, id, data, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(table)
        .bind(&id)
        .bind(&data)
        .bind(&now)
        .bind(&now)
        .execute(self.db.pool())
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate(table, id.as_str()),
            other => other,
        })?;

        debug!(id = %id, "Inserted record");
        Ok(record)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, table: &str, id: &str, patch: Record) -> DbResult<Record> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query("SELECT data FROM records WHERE collection = ? AND id = ?")
            .bind(table)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found(table, id))?;

        let data: String = row.try_get("data")?;
        let mut record = decode(&data)?;
        merge_patch(&mut record, patch);

        sqlx::query(
            "UPDATE records SET data = ?, updated_at = ? WHERE collection = ? AND id = ?",
        )
        .bind(serde_json::to_string(&record)?)
        .bind(Utc::now().to_rfc3339())
        .bind(table)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!("Updated record");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn remove(&self, table: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM records WHERE collection = ? AND id = ?")
            .bind(table)
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(table, id));
        }

        debug!("Removed record");
        Ok(())
    }
}
