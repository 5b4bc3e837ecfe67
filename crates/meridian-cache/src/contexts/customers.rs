//! # Customers Context
//!
//! Customer list plus loyalty point operations.
//!
//! ## Loyalty Operations
//! ```text
//! adjust_points(id, +50)   balance 120 ──► 170
//! adjust_points(id, -200)  balance 170 ──► InsufficientPoints (nothing written)
//! redeem_points(id, 100)   balance 170 ──► 70
//! ```
//! Both read the balance from the cache and write it back through
//! `update`, so the stored value is what the backend confirmed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meridian_core::validation::{apply_delta, ValidationResult};
use meridian_core::{views, CoreError, Customer, CustomerPatch, ValidationError};
use serde::{Deserialize, Serialize};

use super::StoredEntity;
use crate::cache::{CustomOperation, OperationScope, Resource};
use crate::error::CacheResult;

impl Resource for Customer {
    type Patch = CustomerPatch;

    fn validate(&self) -> ValidationResult<()> {
        Customer::validate(self)
    }

    fn validate_patch(patch: &CustomerPatch) -> ValidationResult<()> {
        patch.validate()
    }
}

impl StoredEntity for Customer {
    const TABLE: &'static str = "customers";
    type Record = CustomerRecord;
    type PatchRecord = CustomerPatchRecord;
}

// =============================================================================
// Storage Records
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub loyalty_points: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerRecord {
    fn from(c: Customer) -> Self {
        CustomerRecord {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            loyalty_points: c.loyalty_points,
            notes: c.notes,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<CustomerRecord> for Customer {
    fn from(r: CustomerRecord) -> Self {
        Customer {
            id: r.id,
            name: r.name,
            email: r.email,
            phone: r.phone,
            loyalty_points: r.loyalty_points,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Partial customer record. Every patch stamps `updatedAt`; `None` fields
/// are omitted, so they keep their stored value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatchRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty_points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerPatch> for CustomerPatchRecord {
    fn from(p: CustomerPatch) -> Self {
        CustomerPatchRecord {
            name: p.name,
            email: p.email,
            phone: p.phone,
            loyalty_points: p.loyalty_points,
            notes: p.notes,
            updated_at: Utc::now(),
        }
    }
}

// =============================================================================
// Custom Operations
// =============================================================================

/// Adds `delta` (possibly negative) to a customer's balance.
pub struct AdjustPoints {
    pub customer_id: String,
    pub delta: i64,
}

#[async_trait]
impl CustomOperation<Customer> for AdjustPoints {
    type Output = Customer;

    fn name(&self) -> &'static str {
        "adjust_points"
    }

    async fn run(&self, scope: OperationScope<'_, Customer>) -> CacheResult<Customer> {
        let customer = scope.require(&self.customer_id)?;
        let balance = apply_delta("loyalty_points", customer.loyalty_points, self.delta)?;

        if balance < 0 {
            return Err(CoreError::InsufficientPoints {
                customer_id: customer.id,
                available: customer.loyalty_points,
                requested: self.delta.saturating_neg(),
            }
            .into());
        }

        let patch = CustomerPatch {
            loyalty_points: Some(balance),
            ..Default::default()
        };
        scope.update(&self.customer_id, patch).await
    }
}

/// Spends `points` from a customer's balance.
pub struct RedeemPoints {
    pub customer_id: String,
    pub points: i64,
}

#[async_trait]
impl CustomOperation<Customer> for RedeemPoints {
    type Output = Customer;

    fn name(&self) -> &'static str {
        "redeem_points"
    }

    async fn run(&self, scope: OperationScope<'_, Customer>) -> CacheResult<Customer> {
        if self.points <= 0 {
            return Err(ValidationError::OutOfRange {
                field: "points".to_string(),
                min: 1,
                max: i64::MAX,
            }
            .into());
        }

        AdjustPoints {
            customer_id: self.customer_id.clone(),
            delta: -self.points,
        }
        .run(scope)
        .await
    }
}

// =============================================================================
// Context
// =============================================================================

resource_context! {
    /// Customers and their loyalty balances.
    CustomersContext, Customer
}

impl CustomersContext {
    pub async fn adjust_points(&self, customer_id: &str, delta: i64) -> CacheResult<Customer> {
        self.execute(AdjustPoints {
            customer_id: customer_id.to_string(),
            delta,
        })
        .await
    }

    pub async fn redeem_points(&self, customer_id: &str, points: i64) -> CacheResult<Customer> {
        self.execute(RedeemPoints {
            customer_id: customer_id.to_string(),
            points,
        })
        .await
    }

    /// Customers with the highest balances first.
    pub fn top_customers(&self, limit: usize) -> Vec<Customer> {
        views::top_customers(&self.items(), limit)
            .into_iter()
            .cloned()
            .collect()
    }
}
