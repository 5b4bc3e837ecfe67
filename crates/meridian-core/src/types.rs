//! # Domain Types
//!
//! The entities the back office manages, and one patch type per entity.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Product     │   │      Store      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  sku            │   │  name           │       │
//! │  │  loyalty_points │   │  stock          │   │  address        │       │
//! │  └─────────────────┘   │  stock_by_store │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────────────────────────┐         │
//! │  │    Supplier     │   │          PurchaseOrder              │         │
//! │  │  ─────────────  │   │  ─────────────────────────────────  │         │
//! │  │  id (UUID)      │◄──│  supplier_id, store_id              │         │
//! │  │  name, contact  │   │  status: Draft→Ordered→Received     │         │
//! │  └─────────────────┘   │  lines: [product_id, qty, cost]     │         │
//! │                        └─────────────────────────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Patches
//! Every entity has a `*Patch` companion where each field is optional. A
//! patch names only the fields to change; `id` is never patchable.
//!
//! `None` means "leave as is", so a patch cannot clear an optional field
//! (email, notes, barcode, ...). Clearing one means replacing the entity:
//! `remove` followed by `create` with the field unset.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::new_id;
use crate::validation::{
    validate_cents, validate_email, validate_line_quantity, validate_name, validate_non_negative,
    validate_reference, validate_sku, ValidationResult,
};

/// Anything keyed by a unique string identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

// =============================================================================
// Customer
// =============================================================================

/// A customer enrolled in the loyalty program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Current loyalty balance. Never negative.
    pub loyalty_points: i64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Creates a customer with a fresh id and an empty loyalty balance.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Customer {
            id: new_id(),
            name: name.into(),
            email: None,
            phone: None,
            loyalty_points: 0,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        validate_non_negative("loyalty_points", self.loyalty_points)
    }
}

/// Partial update for a [`Customer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub loyalty_points: Option<i64>,
    pub notes: Option<String>,
}

impl CustomerPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(points) = self.loyalty_points {
            validate_non_negative("loyalty_points", points)?;
        }
        Ok(())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalogue.
///
/// ## Stock Model
/// `stock` is the total on hand. `stock_by_store` holds per-store overrides;
/// a store absent from the map falls back to the total (see
/// [`crate::views::effective_stock`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    /// Stock Keeping Unit - business identifier.
    pub sku: String,
    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,
    pub name: String,
    pub category: Option<String>,
    /// Price in cents (smallest currency unit).
    pub price_cents: i64,
    /// Cost in cents (for inventory valuation).
    pub cost_cents: Option<i64>,
    pub stock: i64,
    pub stock_by_store: BTreeMap<String, i64>,
    /// Overrides [`crate::DEFAULT_LOW_STOCK_THRESHOLD`] for this product.
    pub low_stock_threshold: Option<i64>,
    pub supplier_id: Option<String>,
    /// Whether product is active (soft delete).
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates an active product with no stock.
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price_cents: i64) -> Self {
        let now = Utc::now();
        Product {
            id: new_id(),
            sku: sku.into(),
            barcode: None,
            name: name.into(),
            category: None,
            price_cents,
            cost_cents: None,
            stock: 0,
            stock_by_store: BTreeMap::new(),
            low_stock_threshold: None,
            supplier_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_sku(&self.sku)?;
        validate_name("name", &self.name)?;
        validate_cents("price_cents", self.price_cents)?;
        if let Some(cost) = self.cost_cents {
            validate_cents("cost_cents", cost)?;
        }
        validate_non_negative("stock", self.stock)?;
        for quantity in self.stock_by_store.values() {
            validate_non_negative("stock_by_store", *quantity)?;
        }
        Ok(())
    }
}

/// Partial update for a [`Product`].
///
/// `stock_by_store` replaces the whole override map when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPatch {
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub cost_cents: Option<i64>,
    pub stock: Option<i64>,
    pub stock_by_store: Option<BTreeMap<String, i64>>,
    pub low_stock_threshold: Option<i64>,
    pub supplier_id: Option<String>,
    pub is_active: Option<bool>,
}

impl ProductPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(sku) = &self.sku {
            validate_sku(sku)?;
        }
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(price) = self.price_cents {
            validate_cents("price_cents", price)?;
        }
        if let Some(cost) = self.cost_cents {
            validate_cents("cost_cents", cost)?;
        }
        if let Some(stock) = self.stock {
            validate_non_negative("stock", stock)?;
        }
        if let Some(map) = &self.stock_by_store {
            for quantity in map.values() {
                validate_non_negative("stock_by_store", *quantity)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Store
// =============================================================================

/// A physical store (stock partition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Store {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn new(name: impl Into<String>) -> Self {
        Store {
            id: new_id(),
            name: name.into(),
            address: None,
            phone: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)
    }
}

/// Partial update for a [`Store`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StorePatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

impl StorePatch {
    pub fn validate(&self) -> ValidationResult<()> {
        match &self.name {
            Some(name) => validate_name("name", name),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// A vendor products are purchased from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(name: impl Into<String>) -> Self {
        Supplier {
            id: new_id(),
            name: name.into(),
            contact_name: None,
            email: None,
            phone: None,
            address: None,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        match &self.email {
            Some(email) => validate_email(email),
            None => Ok(()),
        }
    }
}

/// Partial update for a [`Supplier`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl SupplierPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

// =============================================================================
// Purchase Order Status
// =============================================================================

/// Lifecycle of a purchase order.
///
/// ```text
///   Draft ──► Ordered ──► Received
///     │          │
///     └────┬─────┘
///          ▼
///      Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    /// Being assembled, not yet sent to the supplier.
    #[default]
    Draft,
    /// Sent to the supplier.
    Ordered,
    /// Goods arrived.
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    /// Whether `self -> next` is an allowed transition.
    pub fn can_transition_to(self, next: PurchaseOrderStatus) -> bool {
        use PurchaseOrderStatus::*;
        matches!(
            (self, next),
            (Draft, Ordered) | (Ordered, Received) | (Draft, Cancelled) | (Ordered, Cancelled)
        )
    }

    /// Received and Cancelled orders are closed.
    pub fn is_open(self) -> bool {
        matches!(self, PurchaseOrderStatus::Draft | PurchaseOrderStatus::Ordered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "draft",
            PurchaseOrderStatus::Ordered => "ordered",
            PurchaseOrderStatus::Received => "received",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Purchase Order
// =============================================================================

/// One line of a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrderLine {
    pub product_id: String,
    pub quantity: i64,
    /// Agreed unit cost in cents.
    pub unit_cost_cents: i64,
}

impl PurchaseOrderLine {
    /// Line total (unit cost × quantity).
    pub fn total(&self) -> Money {
        Money::from_cents(self.unit_cost_cents).times(self.quantity)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_reference("product_id", &self.product_id)?;
        validate_line_quantity(self.quantity)?;
        validate_cents("unit_cost_cents", self.unit_cost_cents)
    }
}

/// An order placed with a supplier for delivery to a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrder {
    pub id: String,
    pub supplier_id: String,
    pub store_id: Option<String>,
    pub status: PurchaseOrderStatus,
    pub lines: Vec<PurchaseOrderLine>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub expected_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub received_at: Option<DateTime<Utc>>,
}

impl PurchaseOrder {
    /// Creates an empty draft order for a supplier.
    pub fn new(supplier_id: impl Into<String>) -> Self {
        PurchaseOrder {
            id: new_id(),
            supplier_id: supplier_id.into(),
            store_id: None,
            status: PurchaseOrderStatus::Draft,
            lines: Vec::new(),
            notes: None,
            created_at: Utc::now(),
            expected_at: None,
            received_at: None,
        }
    }

    /// Appends a line, builder style.
    pub fn with_line(mut self, product_id: impl Into<String>, quantity: i64, unit_cost_cents: i64) -> Self {
        self.lines.push(PurchaseOrderLine {
            product_id: product_id.into(),
            quantity,
            unit_cost_cents,
        });
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_reference("supplier_id", &self.supplier_id)?;
        self.lines.iter().try_for_each(PurchaseOrderLine::validate)
    }
}

/// Partial update for a [`PurchaseOrder`].
///
/// `lines` replaces the whole line list when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrderPatch {
    pub store_id: Option<String>,
    pub status: Option<PurchaseOrderStatus>,
    pub lines: Option<Vec<PurchaseOrderLine>>,
    pub notes: Option<String>,
    #[ts(as = "Option<String>")]
    pub expected_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub received_at: Option<DateTime<Utc>>,
}

impl PurchaseOrderPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        match &self.lines {
            Some(lines) => lines.iter().try_for_each(PurchaseOrderLine::validate),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Identified impls
// =============================================================================

macro_rules! impl_identified {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identified for $ty {
                #[inline]
                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_identified!(Customer, Product, Store, Supplier, PurchaseOrder);

// =============================================================================
// Unit Tests
// =============================================================================
