//! # Products Context
//!
//! Catalogue, stock levels and the stock views the back office screens use.
//!
//! ## Stock Adjustments
//! ```text
//! adjust_stock(id, None, -3)          stock 10 ──► 7
//! adjust_stock(id, Some("s-1"), -3)   stock_by_store["s-1"] 4 ──► 1
//!                                     stock 10 ──► 7
//! set_store_stock(id, "s-1", 12)      stock_by_store["s-1"] ──► 12 (total unchanged)
//! ```
//! An adjustment that would leave a negative quantity is rejected before
//! anything is written.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meridian_core::validation::{
    apply_delta, validate_non_negative, validate_reference, ValidationResult,
};
use meridian_core::{
    views, CoreError, Money, Product, ProductPatch, DEFAULT_LOW_STOCK_THRESHOLD,
};
use serde::{Deserialize, Serialize};

use super::StoredEntity;
use crate::cache::{CustomOperation, OperationScope, Resource};
use crate::error::CacheResult;

impl Resource for Product {
    type Patch = ProductPatch;

    fn validate(&self) -> ValidationResult<()> {
        Product::validate(self)
    }

    fn validate_patch(patch: &ProductPatch) -> ValidationResult<()> {
        patch.validate()
    }
}

impl StoredEntity for Product {
    const TABLE: &'static str = "products";
    type Record = ProductRecord;
    type PatchRecord = ProductPatchRecord;
}

// =============================================================================
// Storage Records
// =============================================================================

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub price_cents: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_cents: Option<i64>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub stock_by_store: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductRecord {
    fn from(p: Product) -> Self {
        ProductRecord {
            id: p.id,
            sku: p.sku,
            barcode: p.barcode,
            name: p.name,
            category: p.category,
            price_cents: p.price_cents,
            cost_cents: p.cost_cents,
            stock: p.stock,
            stock_by_store: p.stock_by_store,
            low_stock_threshold: p.low_stock_threshold,
            supplier_id: p.supplier_id,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Product {
            id: r.id,
            sku: r.sku,
            barcode: r.barcode,
            name: r.name,
            category: r.category,
            price_cents: r.price_cents,
            cost_cents: r.cost_cents,
            stock: r.stock,
            stock_by_store: r.stock_by_store,
            low_stock_threshold: r.low_stock_threshold,
            supplier_id: r.supplier_id,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Partial product record. `stockByStore` replaces the whole map.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatchRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_by_store: Option<BTreeMap<String, i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductPatch> for ProductPatchRecord {
    fn from(p: ProductPatch) -> Self {
        ProductPatchRecord {
            sku: p.sku,
            barcode: p.barcode,
            name: p.name,
            category: p.category,
            price_cents: p.price_cents,
            cost_cents: p.cost_cents,
            stock: p.stock,
            stock_by_store: p.stock_by_store,
            low_stock_threshold: p.low_stock_threshold,
            supplier_id: p.supplier_id,
            is_active: p.is_active,
            updated_at: Utc::now(),
        }
    }
}

// =============================================================================
// Custom Operations
// =============================================================================

fn insufficient(product: &Product, available: i64, delta: i64) -> CoreError {
    CoreError::InsufficientStock {
        sku: product.sku.clone(),
        available,
        requested: delta.saturating_neg(),
    }
}

/// Moves stock by `delta`, optionally for one store.
///
/// With a store, that store's quantity (its override, or the total when it
/// has none) and the total both move by `delta`.
pub struct AdjustStock {
    pub product_id: String,
    pub store_id: Option<String>,
    pub delta: i64,
}

#[async_trait]
impl CustomOperation<Product> for AdjustStock {
    type Output = Product;

    fn name(&self) -> &'static str {
        "adjust_stock"
    }

    async fn run(&self, scope: OperationScope<'_, Product>) -> CacheResult<Product> {
        let product = scope.require(&self.product_id)?;
        let mut patch = ProductPatch::default();

        if let Some(store_id) = &self.store_id {
            let current = views::effective_stock(&product, Some(store_id.as_str()));
            let next = apply_delta("stock_by_store", current, self.delta)?;
            if next < 0 {
                return Err(insufficient(&product, current, self.delta).into());
            }
            let mut by_store = product.stock_by_store.clone();
            by_store.insert(store_id.clone(), next);
            patch.stock_by_store = Some(by_store);
        }

        let total = apply_delta("stock", product.stock, self.delta)?;
        if total < 0 {
            return Err(insufficient(&product, product.stock, self.delta).into());
        }
        patch.stock = Some(total);

        scope.update(&self.product_id, patch).await
    }
}

/// Sets one store's quantity outright.
pub struct SetStoreStock {
    pub product_id: String,
    pub store_id: String,
    pub quantity: i64,
}

#[async_trait]
impl CustomOperation<Product> for SetStoreStock {
    type Output = Product;

    fn name(&self) -> &'static str {
        "set_store_stock"
    }

    async fn run(&self, scope: OperationScope<'_, Product>) -> CacheResult<Product> {
        validate_reference("store_id", &self.store_id)?;
        validate_non_negative("quantity", self.quantity)?;

        let product = scope.require(&self.product_id)?;
        let mut by_store = product.stock_by_store;
        by_store.insert(self.store_id.clone(), self.quantity);

        let patch = ProductPatch {
            stock_by_store: Some(by_store),
            ..Default::default()
        };
        scope.update(&self.product_id, patch).await
    }
}

// =============================================================================
// Context
// =============================================================================

resource_context! {
    /// The product catalogue with per-store stock.
    ProductsContext, Product
}

impl ProductsContext {
    pub async fn adjust_stock(
        &self,
        product_id: &str,
        store_id: Option<&str>,
        delta: i64,
    ) -> CacheResult<Product> {
        self.execute(AdjustStock {
            product_id: product_id.to_string(),
            store_id: store_id.map(str::to_string),
            delta,
        })
        .await
    }

    pub async fn set_store_stock(
        &self,
        product_id: &str,
        store_id: &str,
        quantity: i64,
    ) -> CacheResult<Product> {
        self.execute(SetStoreStock {
            product_id: product_id.to_string(),
            store_id: store_id.to_string(),
            quantity,
        })
        .await
    }

    /// Soft delete: the product stays in the catalogue but stops selling.
    pub async fn deactivate(&self, product_id: &str) -> CacheResult<Product> {
        let patch = ProductPatch {
            is_active: Some(false),
            ..Default::default()
        };
        self.update(product_id, patch).await
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Stock of a product for a store, or its total with no store.
    pub fn effective_stock(&self, product_id: &str, store_id: Option<&str>) -> Option<i64> {
        self.get(product_id)
            .map(|product| views::effective_stock(&product, store_id))
    }

    /// Products at or below `threshold` (default
    /// [`DEFAULT_LOW_STOCK_THRESHOLD`]), most urgent first.
    pub fn low_stock(&self, threshold: Option<i64>, store_id: Option<&str>) -> Vec<Product> {
        let threshold = threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        views::low_stock(&self.items(), threshold, store_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn search(&self, query: &str) -> Vec<Product> {
        views::search_products(&self.items(), query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn find_by_sku(&self, sku: &str) -> Option<Product> {
        self.items().iter().find(|p| p.sku == sku).cloned()
    }

    pub fn inventory_value(&self, store_id: Option<&str>) -> Money {
        views::inventory_value(&self.items(), store_id)
    }
}
