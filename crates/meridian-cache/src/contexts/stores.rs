//! # Stores Context

use chrono::{DateTime, Utc};
use meridian_core::validation::ValidationResult;
use meridian_core::{Store, StorePatch};
use serde::{Deserialize, Serialize};

use super::StoredEntity;
use crate::cache::Resource;

impl Resource for Store {
    type Patch = StorePatch;

    fn validate(&self) -> ValidationResult<()> {
        Store::validate(self)
    }

    fn validate_patch(patch: &StorePatch) -> ValidationResult<()> {
        patch.validate()
    }
}

impl StoredEntity for Store {
    const TABLE: &'static str = "stores";
    type Record = StoreRecord;
    type PatchRecord = StorePatchRecord;
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl From<Store> for StoreRecord {
    fn from(s: Store) -> Self {
        StoreRecord {
            id: s.id,
            name: s.name,
            address: s.address,
            phone: s.phone,
            is_active: s.is_active,
            created_at: s.created_at,
        }
    }
}

impl From<StoreRecord> for Store {
    fn from(r: StoreRecord) -> Self {
        Store {
            id: r.id,
            name: r.name,
            address: r.address,
            phone: r.phone,
            is_active: r.is_active,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePatchRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl From<StorePatch> for StorePatchRecord {
    fn from(p: StorePatch) -> Self {
        StorePatchRecord {
            name: p.name,
            address: p.address,
            phone: p.phone,
            is_active: p.is_active,
        }
    }
}

resource_context! {
    /// The business's physical locations.
    StoresContext, Store
}

impl StoresContext {
    /// Stores currently open for business, in display order.
    pub fn active(&self) -> Vec<Store> {
        self.items().iter().filter(|s| s.is_active).cloned().collect()
    }
}
