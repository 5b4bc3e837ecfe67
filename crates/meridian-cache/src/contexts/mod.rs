//! # Resource Contexts
//!
//! One [`ResourceCache`] per entity, bound to its table in the record store.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Context                 Table              Custom operations           │
//! │  ───────                 ─────              ─────────────────           │
//! │  CustomersContext        customers          adjust_points, redeem       │
//! │  ProductsContext         products           adjust_stock, set_store     │
//! │  StoresContext           stores             (plain CRUD)                │
//! │  SuppliersContext        suppliers          (plain CRUD)                │
//! │  PurchaseOrdersContext   purchase_orders    place, receive, cancel      │
//! │                                                                         │
//! │  Each context derefs to ResourceCache<Entity>: items(), mount(),       │
//! │  create(), update(), remove(), refresh(), subscribe() come for free.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use meridian_core::{Customer, Product, PurchaseOrder, Store, Supplier};
use meridian_db::RecordStore;

use crate::cache::ResourceCache;
use crate::config::ResourceSettings;

/// Declares a context newtype over `ResourceCache<$entity>`.
macro_rules! resource_context {
    ($(#[$meta:meta])* $name:ident, $entity:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name($crate::cache::ResourceCache<$entity>);

        impl $name {
            pub fn new(
                store: std::sync::Arc<dyn meridian_db::RecordStore>,
                settings: $crate::config::ResourceSettings,
            ) -> Self {
                $name($crate::contexts::table_cache::<$entity>(store, settings))
            }

            /// Wraps an existing cache, e.g. one built over a custom backend.
            pub fn from_cache(cache: $crate::cache::ResourceCache<$entity>) -> Self {
                $name(cache)
            }

            pub fn cache(&self) -> &$crate::cache::ResourceCache<$entity> {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::cache::ResourceCache<$entity>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
    };
}

mod customers;
mod products;
mod purchase_orders;
mod stores;
mod suppliers;
mod table;

pub use customers::{AdjustPoints, CustomersContext, RedeemPoints};
pub use products::{AdjustStock, ProductsContext, SetStoreStock};
pub use purchase_orders::{PurchaseOrdersContext, Transition};
pub use stores::StoresContext;
pub use suppliers::SuppliersContext;
pub use table::{StoredEntity, TableBackend};

/// Every resource name, as used in `[resources.<name>]` config sections.
pub const RESOURCE_NAMES: [&str; 5] = [
    <Customer as StoredEntity>::TABLE,
    <Product as StoredEntity>::TABLE,
    <Store as StoredEntity>::TABLE,
    <Supplier as StoredEntity>::TABLE,
    <PurchaseOrder as StoredEntity>::TABLE,
];

/// Builds the cache for `E` over its table.
pub(crate) fn table_cache<E: StoredEntity>(
    store: Arc<dyn RecordStore>,
    settings: ResourceSettings,
) -> ResourceCache<E> {
    ResourceCache::<E>::builder(E::TABLE, Arc::new(TableBackend::<E>::new(store)))
        .lazy(settings.lazy)
        .on_missing(settings.on_missing)
        .build()
}
