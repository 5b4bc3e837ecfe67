//! # Suppliers Context

use chrono::{DateTime, Utc};
use meridian_core::validation::ValidationResult;
use meridian_core::{Supplier, SupplierPatch};
use serde::{Deserialize, Serialize};

use super::StoredEntity;
use crate::cache::Resource;

impl Resource for Supplier {
    type Patch = SupplierPatch;

    fn validate(&self) -> ValidationResult<()> {
        Supplier::validate(self)
    }

    fn validate_patch(patch: &SupplierPatch) -> ValidationResult<()> {
        patch.validate()
    }
}

impl StoredEntity for Supplier {
    const TABLE: &'static str = "suppliers";
    type Record = SupplierRecord;
    type PatchRecord = SupplierPatchRecord;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl From<Supplier> for SupplierRecord {
    fn from(s: Supplier) -> Self {
        SupplierRecord {
            id: s.id,
            name: s.name,
            contact_name: s.contact_name,
            email: s.email,
            phone: s.phone,
            address: s.address,
            created_at: s.created_at,
        }
    }
}

impl From<SupplierRecord> for Supplier {
    fn from(r: SupplierRecord) -> Self {
        Supplier {
            id: r.id,
            name: r.name,
            contact_name: r.contact_name,
            email: r.email,
            phone: r.phone,
            address: r.address,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPatchRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<SupplierPatch> for SupplierPatchRecord {
    fn from(p: SupplierPatch) -> Self {
        SupplierPatchRecord {
            name: p.name,
            contact_name: p.contact_name,
            email: p.email,
            phone: p.phone,
            address: p.address,
        }
    }
}

resource_context! {
    /// Vendors purchase orders are placed with.
    SuppliersContext, Supplier
}
