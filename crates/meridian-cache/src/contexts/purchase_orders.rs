//! # Purchase Orders Context
//!
//! Orders placed with suppliers and their status machine.
//!
//! ## Status Changes
//! ```text
//! place(id)     Draft   ──► Ordered
//! receive(id)   Ordered ──► Received   (stamps received_at)
//! cancel(id)    Draft | Ordered ──► Cancelled
//!
//! Anything else ──► Rejected(InvalidStatusTransition), nothing written
//! ```
//!
//! A plain `update` carrying a `status` bypasses the machine; screens use
//! the operations above.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meridian_core::validation::ValidationResult;
use meridian_core::{
    views, CoreError, Money, PurchaseOrder, PurchaseOrderLine, PurchaseOrderPatch,
    PurchaseOrderStatus,
};
use serde::{Deserialize, Serialize};

use super::StoredEntity;
use crate::cache::{CustomOperation, OperationScope, Resource};
use crate::error::CacheResult;

impl Resource for PurchaseOrder {
    type Patch = PurchaseOrderPatch;

    fn validate(&self) -> ValidationResult<()> {
        PurchaseOrder::validate(self)
    }

    fn validate_patch(patch: &PurchaseOrderPatch) -> ValidationResult<()> {
        patch.validate()
    }
}

impl StoredEntity for PurchaseOrder {
    const TABLE: &'static str = "purchase_orders";
    type Record = PurchaseOrderRecord;
    type PatchRecord = PurchaseOrderPatchRecord;
}

// =============================================================================
// Storage Records
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRecord {
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
}

impl From<PurchaseOrderLine> for LineRecord {
    fn from(l: PurchaseOrderLine) -> Self {
        LineRecord {
            product_id: l.product_id,
            quantity: l.quantity,
            unit_cost_cents: l.unit_cost_cents,
        }
    }
}

impl From<LineRecord> for PurchaseOrderLine {
    fn from(r: LineRecord) -> Self {
        PurchaseOrderLine {
            product_id: r.product_id,
            quantity: r.quantity,
            unit_cost_cents: r.unit_cost_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderRecord {
    pub id: String,
    pub supplier_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(default)]
    pub status: PurchaseOrderStatus,
    #[serde(default)]
    pub lines: Vec<LineRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
}

impl From<PurchaseOrder> for PurchaseOrderRecord {
    fn from(o: PurchaseOrder) -> Self {
        PurchaseOrderRecord {
            id: o.id,
            supplier_id: o.supplier_id,
            store_id: o.store_id,
            status: o.status,
            lines: o.lines.into_iter().map(LineRecord::from).collect(),
            notes: o.notes,
            created_at: o.created_at,
            expected_at: o.expected_at,
            received_at: o.received_at,
        }
    }
}

impl From<PurchaseOrderRecord> for PurchaseOrder {
    fn from(r: PurchaseOrderRecord) -> Self {
        PurchaseOrder {
            id: r.id,
            supplier_id: r.supplier_id,
            store_id: r.store_id,
            status: r.status,
            lines: r.lines.into_iter().map(PurchaseOrderLine::from).collect(),
            notes: r.notes,
            created_at: r.created_at,
            expected_at: r.expected_at,
            received_at: r.received_at,
        }
    }
}

/// Partial order record. `lines` replaces the whole list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderPatchRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PurchaseOrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<LineRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
}

impl From<PurchaseOrderPatch> for PurchaseOrderPatchRecord {
    fn from(p: PurchaseOrderPatch) -> Self {
        PurchaseOrderPatchRecord {
            store_id: p.store_id,
            status: p.status,
            lines: p
                .lines
                .map(|lines| lines.into_iter().map(LineRecord::from).collect()),
            notes: p.notes,
            expected_at: p.expected_at,
            received_at: p.received_at,
        }
    }
}

// =============================================================================
// Custom Operations
// =============================================================================

/// Moves an order to `status` if the status machine allows it.
pub struct Transition {
    pub order_id: String,
    pub status: PurchaseOrderStatus,
}

#[async_trait]
impl CustomOperation<PurchaseOrder> for Transition {
    type Output = PurchaseOrder;

    fn name(&self) -> &'static str {
        "transition"
    }

    async fn run(&self, scope: OperationScope<'_, PurchaseOrder>) -> CacheResult<PurchaseOrder> {
        let order = scope.require(&self.order_id)?;

        if !order.status.can_transition_to(self.status) {
            return Err(CoreError::InvalidStatusTransition {
                order_id: order.id,
                from: order.status,
                to: self.status,
            }
            .into());
        }

        let mut patch = PurchaseOrderPatch {
            status: Some(self.status),
            ..Default::default()
        };
        if self.status == PurchaseOrderStatus::Received {
            patch.received_at = Some(Utc::now());
        }

        scope.update(&self.order_id, patch).await
    }
}

// =============================================================================
// Context
// =============================================================================

resource_context! {
    /// Purchase orders and their status machine.
    PurchaseOrdersContext, PurchaseOrder
}

impl PurchaseOrdersContext {
    pub async fn transition(
        &self,
        order_id: &str,
        status: PurchaseOrderStatus,
    ) -> CacheResult<PurchaseOrder> {
        self.execute(Transition {
            order_id: order_id.to_string(),
            status,
        })
        .await
    }

    pub async fn place(&self, order_id: &str) -> CacheResult<PurchaseOrder> {
        self.transition(order_id, PurchaseOrderStatus::Ordered).await
    }

    pub async fn receive(&self, order_id: &str) -> CacheResult<PurchaseOrder> {
        self.transition(order_id, PurchaseOrderStatus::Received).await
    }

    pub async fn cancel(&self, order_id: &str) -> CacheResult<PurchaseOrder> {
        self.transition(order_id, PurchaseOrderStatus::Cancelled).await
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn with_status(&self, status: PurchaseOrderStatus) -> Vec<PurchaseOrder> {
        views::orders_with_status(&self.items(), status)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Draft and ordered purchase orders for a supplier.
    pub fn open_for_supplier(&self, supplier_id: &str) -> Vec<PurchaseOrder> {
        views::open_orders_for_supplier(&self.items(), supplier_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn total(&self, order_id: &str) -> Option<Money> {
        self.get(order_id)
            .map(|order| views::purchase_order_total(&order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceSettings;
    use crate::error::CacheError;
    use meridian_db::{MemoryStore, RecordStore};
    use std::sync::Arc;

    async fn context() -> (Arc<MemoryStore>, PurchaseOrdersContext) {
        let store = Arc::new(MemoryStore::new());
        let ctx = PurchaseOrdersContext::new(store.clone(), ResourceSettings::default());
        ctx.mount().await.unwrap();
        (store, ctx)
    }

    #[tokio::test]
    async fn test_order_lifecycle() {
        let (store, ctx) = context().await;
        let order = PurchaseOrder::new("sup-1")
            .with_line("p-1", 24, 80)
            .with_line("p-2", 6, 450);
        let order = ctx.create(order).await.unwrap();

        assert_eq!(ctx.total(&order.id), Some(Money::from_cents(24 * 80 + 6 * 450)));
        assert_eq!(ctx.open_for_supplier("sup-1").len(), 1);

        let placed = ctx.place(&order.id).await.unwrap();
        assert_eq!(placed.status, PurchaseOrderStatus::Ordered);
        assert!(placed.received_at.is_none());

        let received = ctx.receive(&order.id).await.unwrap();
        assert_eq!(received.status, PurchaseOrderStatus::Received);
        assert!(received.received_at.is_some());
        assert!(ctx.open_for_supplier("sup-1").is_empty());
        assert_eq!(ctx.with_status(PurchaseOrderStatus::Received).len(), 1);

        let records = store.load_all("purchase_orders").await.unwrap();
        assert_eq!(records[0]["status"], "received");
        assert_eq!(records[0]["lines"][0]["unitCostCents"], 80);
    }

    #[tokio::test]
    async fn test_invalid_transition_is_rejected() {
        let (_, ctx) = context().await;
        let order = ctx
            .create(PurchaseOrder::new("sup-1").with_line("p-1", 1, 100))
            .await
            .unwrap();

        let err = ctx.receive(&order.id).await.unwrap_err();
        assert_eq!(
            err,
            CacheError::Rejected(CoreError::InvalidStatusTransition {
                order_id: order.id.clone(),
                from: PurchaseOrderStatus::Draft,
                to: PurchaseOrderStatus::Received,
            })
        );

        ctx.cancel(&order.id).await.unwrap();
        assert!(ctx.place(&order.id).await.is_err());
        assert_eq!(
            ctx.get(&order.id).unwrap().status,
            PurchaseOrderStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_invalid_lines_never_reach_backend() {
        let (store, ctx) = context().await;

        let err = ctx
            .create(PurchaseOrder::new("sup-1").with_line("p-1", 0, 100))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Invalid(_)));
        assert_eq!(store.len("purchase_orders").await, 0);
    }
}
