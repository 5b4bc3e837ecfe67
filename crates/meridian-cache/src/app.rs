//! # Application Context
//!
//! Built once at startup and passed down to every screen. Holds one
//! resource context per entity, all sharing the same record store.
//!
//! ## Startup
//! ```text
//! AppConfig::load()
//!      │
//!      ▼
//! AppContext::open(&config)     Database::new ─► SqliteStore
//!      │
//!      ▼
//! AppContext::start()           eager caches load concurrently
//!      │                        (products, stores by default)
//!      ▼
//! screens call mount() on the lazy ones as they appear
//! ```

use std::sync::Arc;

use futures_util::future::join5;
use meridian_core::PurchaseOrder;
use meridian_db::{Database, RecordStore, SqliteStore};
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::contexts::{
    CustomersContext, ProductsContext, PurchaseOrdersContext, StoresContext, SuppliersContext,
};
use crate::error::{CacheError, CacheResult};

/// Every resource context, wired to one record store.
///
/// Cheap to clone; clones share the same caches.
#[derive(Clone)]
pub struct AppContext {
    store: Arc<dyn RecordStore>,
    pub customers: CustomersContext,
    pub products: ProductsContext,
    pub stores: StoresContext,
    pub suppliers: SuppliersContext,
    pub purchase_orders: PurchaseOrdersContext,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("customers", &self.customers)
            .field("products", &self.products)
            .field("stores", &self.stores)
            .field("suppliers", &self.suppliers)
            .field("purchase_orders", &self.purchase_orders)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Builds the contexts over an existing store. Nothing is loaded yet.
    pub fn new(store: Arc<dyn RecordStore>, config: &AppConfig) -> Self {
        AppContext {
            customers: CustomersContext::new(store.clone(), config.resource("customers")),
            products: ProductsContext::new(store.clone(), config.resource("products")),
            stores: StoresContext::new(store.clone(), config.resource("stores")),
            suppliers: SuppliersContext::new(store.clone(), config.resource("suppliers")),
            purchase_orders: PurchaseOrdersContext::new(
                store.clone(),
                config.resource("purchase_orders"),
            ),
            store,
        }
    }

    /// Opens the configured SQLite database and builds the contexts over it.
    pub async fn open(config: &AppConfig) -> CacheResult<Self> {
        let db_config = config.db_config()?;

        if !db_config.is_in_memory() {
            if let Some(parent) = db_config.database_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CacheError::Storage(format!(
                        "Cannot create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let db = Database::new(db_config).await?;
        info!("Record store ready");

        Ok(Self::new(Arc::new(SqliteStore::new(db)), config))
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Kicks the initial load of every eager cache, concurrently.
    ///
    /// Failures are logged and left in each cache's `Error` state; a screen
    /// recovers them with `refresh()`.
    pub async fn start(&self) {
        let (customers, products, stores, suppliers, purchase_orders) = join5(
            self.customers.initialize(),
            self.products.initialize(),
            self.stores.initialize(),
            self.suppliers.initialize(),
            self.purchase_orders.initialize(),
        )
        .await;

        let outcomes = [
            ("customers", customers),
            ("products", products),
            ("stores", stores),
            ("suppliers", suppliers),
            ("purchase_orders", purchase_orders),
        ];

        let mut failed = 0;
        for (resource, outcome) in outcomes {
            if let Err(e) = outcome {
                failed += 1;
                error!(resource, error = %e, "Initial load failed");
            }
        }

        info!(failed, "Eager resources initialized");
    }

    /// Reloads every cache concurrently. Returns the first failure after all
    /// loads have settled.
    pub async fn refresh_all(&self) -> CacheResult<()> {
        let (customers, products, stores, suppliers, purchase_orders) = join5(
            self.customers.refresh(),
            self.products.refresh(),
            self.stores.refresh(),
            self.suppliers.refresh(),
            self.purchase_orders.refresh(),
        )
        .await;

        customers?;
        products?;
        stores?;
        suppliers?;
        purchase_orders
    }

    // =========================================================================
    // Cross-resource workflows
    // =========================================================================

    /// Marks an order received and books its lines into stock.
    ///
    /// Lines go to the order's store when it has one, otherwise to the
    /// product totals. Not transactional: the order is already `Received`
    /// when a stock adjustment fails, and the failure is returned.
    pub async fn receive_purchase_order(&self, order_id: &str) -> CacheResult<PurchaseOrder> {
        self.purchase_orders.mount().await?;
        self.products.mount().await?;

        let order = self.purchase_orders.receive(order_id).await?;

        for line in &order.lines {
            if let Err(e) = self
                .products
                .adjust_stock(&line.product_id, order.store_id.as_deref(), line.quantity)
                .await
            {
                warn!(
                    order_id,
                    product_id = %line.product_id,
                    error = %e,
                    "Order received but stock not booked"
                );
                return Err(e);
            }
        }

        info!(order_id, lines = order.lines.len(), "Purchase order received into stock");
        Ok(order)
    }
}
