//! # In-Memory Record Store
//!
//! A `RecordStore` that keeps every table in a `Vec` behind a tokio `RwLock`.
//! Same semantics as [`crate::SqliteStore`]; used by tests and demos.
//!
//! The store can be switched offline with [`MemoryStore::set_available`] to
//! exercise failure paths: every operation then fails with
//! `DbError::ConnectionFailed`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::store::{merge_patch, record_id, Record, RecordStore};

#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            tables: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulates the storage going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of records in a table.
    pub async fn len(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, Vec::len)
    }

    fn check_available(&self) -> DbResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DbError::ConnectionFailed("storage unavailable".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load_all(&self, table: &str) -> DbResult<Vec<Record>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.get(table).cloned().unwrap_or_default())
    }

    async fn insert(&self, table: &str, record: Record) -> DbResult<Record> {
        self.check_available()?;
        let id = record_id(table, &record)?.to_string();

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();

        if rows.iter().any(|r| r.get("id").and_then(|v| v.as_str()) == Some(id.as_str())) {
            return Err(DbError::duplicate(table, id));
        }

        debug!(table = %table, id = %id, "Inserting record");
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, table: &str, id: &str, patch: Record) -> DbResult<Record> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        let row = tables
            .get_mut(table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|r| r.get("id").and_then(|v| v.as_str()) == Some(id))
            })
            .ok_or_else(|| DbError::not_found(table, id))?;

        debug!(table = %table, id = %id, "Updating record");
        merge_patch(row, patch);
        Ok(row.clone())
    }

    async fn remove(&self, table: &str, id: &str) -> DbResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| DbError::not_found(table, id))?;

        let before = rows.len();
        rows.retain(|r| r.get("id").and_then(|v| v.as_str()) != Some(id));

        if rows.len() == before {
            return Err(DbError::not_found(table, id));
        }

        debug!(table = %table, id = %id, "Removed record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test records are objects"),
        }
    }

    #[tokio::test]
    async fn test_insert_load_preserves_order() {
        let store = MemoryStore::new();
        store.insert("t", record(json!({"id": "b"}))).await.unwrap();
        store.insert("t", record(json!({"id": "a"}))).await.unwrap();

        let ids: Vec<String> = store
            .load_all("t")
            .await
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(store.load_all("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let store = MemoryStore::new();
        store.insert("t", record(json!({"id": "a"}))).await.unwrap();
        let err = store.insert("t", record(json!({"id": "a"}))).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_merges_and_missing_fails() {
        let store = MemoryStore::new();
        store
            .insert("t", record(json!({"id": "a", "value": 1, "label": "x"})))
            .await
            .unwrap();

        let merged = store
            .update("t", "a", record(json!({"value": 2})))
            .await
            .unwrap();
        assert_eq!(Value::Object(merged), json!({"id": "a", "value": 2, "label": "x"}));

        let err = store.update("t", "zzz", Record::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryStore::new();
        store.insert("t", record(json!({"id": "a"}))).await.unwrap();

        store.remove("t", "a").await.unwrap();
        assert_eq!(store.len("t").await, 0);
        assert!(store.remove("t", "a").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_everything() {
        let store = MemoryStore::new();
        store.set_available(false);

        assert!(matches!(
            store.load_all("t").await,
            Err(DbError::ConnectionFailed(_))
        ));

        store.set_available(true);
        assert!(store.load_all("t").await.is_ok());
    }
}
