//! # Table Backend
//!
//! Binds a [`ResourceCache`](crate::cache::ResourceCache) to one table of a
//! [`RecordStore`].
//!
//! ## Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Entity (meridian-core)        EntityRecord (storage schema)            │
//! │  ─────────────────────         ───────────────────────────              │
//! │  snake_case fields      ◄───►  camelCase keys                           │
//! │  Option::None                  key omitted                              │
//! │  DateTime<Utc>                 RFC 3339 string                          │
//! │  BTreeMap<store, qty>          JSON object                              │
//! │                                                                         │
//! │  Patch                  ───►   PatchRecord (only the keys that change)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Patch records never serialize `null`: an absent key leaves the stored
//! value alone, and no patch removes a key.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use meridian_db::{Record, RecordStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cache::{BackendError, Resource, ResourceBackend};

/// An entity with a storage representation.
pub trait StoredEntity: Resource {
    /// Table name in the record store; also the cache's resource name.
    const TABLE: &'static str;

    type Record: Serialize + DeserializeOwned + From<Self> + Into<Self> + Send;

    type PatchRecord: Serialize + From<Self::Patch> + Send;
}

/// [`ResourceBackend`] over one record store table.
pub struct TableBackend<E> {
    store: Arc<dyn RecordStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: StoredEntity> TableBackend<E> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        TableBackend {
            store,
            _entity: PhantomData,
        }
    }
}

fn to_record<S: Serialize>(value: S) -> Result<Record, BackendError> {
    match serde_json::to_value(value)? {
        Value::Object(record) => Ok(record),
        other => Err(format!("expected a JSON object, found {other}").into()),
    }
}

fn from_record<E: StoredEntity>(record: Record) -> Result<E, BackendError> {
    let stored: E::Record = serde_json::from_value(Value::Object(record))?;
    Ok(stored.into())
}

#[async_trait]
impl<E: StoredEntity> ResourceBackend<E> for TableBackend<E> {
    async fn load_all(&self) -> Result<Vec<E>, BackendError> {
        self.store
            .load_all(E::TABLE)
            .await?
            .into_iter()
            .map(from_record::<E>)
            .collect()
    }

    async fn create(&self, item: E) -> Result<E, BackendError> {
        let record = to_record(E::Record::from(item))?;
        let stored = self.store.insert(E::TABLE, record).await?;
        from_record(stored)
    }

    async fn update(&self, id: &str, patch: E::Patch) -> Result<E, BackendError> {
        let partial = to_record(E::PatchRecord::from(patch))?;
        let merged = self.store.update(E::TABLE, id, partial).await?;
        from_record(merged)
    }

    async fn remove(&self, id: &str) -> Result<(), BackendError> {
        self.store.remove(E::TABLE, id).await?;
        Ok(())
    }
}
