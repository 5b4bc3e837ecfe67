//! # Record Store Boundary
//!
//! The four asynchronous operations every backend provides.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load_all(table)            full-table scan, no pagination              │
//! │  insert(table, record)      record must carry a string "id"             │
//! │  update(table, id, patch)   shallow merge, returns the merged record    │
//! │  remove(table, id)          deletes one record                          │
//! │                                                                         │
//! │  update/remove on a missing id → DbError::NotFound                      │
//! │  storage unavailable           → ConnectionFailed / QueryFailed         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Patch Semantics
//! A patch is a partial record. Each key overwrites the stored key; a JSON
//! `null` removes it. The `id` key is never rewritten.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{DbError, DbResult};

/// A stored record: a JSON object keyed by field name.
pub type Record = Map<String, Value>;

/// Name of the identifier field every record carries.
pub const ID_FIELD: &str = "id";

/// Asynchronous, failure-prone key-value/record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns every record in `table`, in insertion order.
    async fn load_all(&self, table: &str) -> DbResult<Vec<Record>>;

    /// Inserts a new record and returns it as stored.
    async fn insert(&self, table: &str, record: Record) -> DbResult<Record>;

    /// Merges `patch` into the record with `id` and returns the result.
    async fn update(&self, table: &str, id: &str, patch: Record) -> DbResult<Record>;

    /// Deletes the record with `id`.
    async fn remove(&self, table: &str, id: &str) -> DbResult<()>;
}

/// Extracts the string id of a record.
pub fn record_id<'a>(table: &str, record: &'a Record) -> DbResult<&'a str> {
    record
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DbError::MissingId {
            table: table.to_string(),
        })
}

/// Applies `patch` onto `target` (see module docs for the rules).
pub fn merge_patch(target: &mut Record, patch: Record) {
    for (key, value) in patch {
        if key == ID_FIELD {
            continue;
        }
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test records are objects"),
        }
    }

    #[test]
    fn test_record_id() {
        let ok = record(json!({"id": "c-1", "name": "Ana"}));
        assert_eq!(record_id("customers", &ok).unwrap(), "c-1");

        let missing = record(json!({"name": "Ana"}));
        assert!(matches!(
            record_id("customers", &missing),
            Err(DbError::MissingId { .. })
        ));

        let numeric = record(json!({"id": 7}));
        assert!(record_id("customers", &numeric).is_err());
    }

    #[test]
    fn test_merge_patch() {
        let mut target = record(json!({"id": "c-1", "name": "Ana", "email": "a@x.io"}));
        let patch = record(json!({"id": "other", "name": "Ana B", "email": null, "points": 3}));

        merge_patch(&mut target, patch);

        assert_eq!(
            Value::Object(target),
            json!({"id": "c-1", "name": "Ana B", "points": 3})
        );
    }
}
