//! # meridian-cache: Async Resource Cache for Meridian POS
//!
//! Keeps an in-memory copy of each entity collection, loads it from the
//! record store on demand, and applies create/update/remove only after the
//! store has confirmed them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Meridian POS Data Flow                            │
//! │                                                                         │
//! │  Screen ──mount()──► ProductsContext ──Deref──► ResourceCache<Product> │
//! │     ▲                                                │                  │
//! │     │ watch::Receiver<Snapshot>                      │ ResourceBackend  │
//! │     │                                                ▼                  │
//! │  ┌──┴──────────────────────────────────────────────────────────────┐   │
//! │  │                  meridian-cache (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │ ResourceCache │   │   Contexts     │   │  AppContext  │   │   │
//! │  │   │  (cache/)     │◄──│  (contexts/)   │◄──│  (app.rs)    │   │   │
//! │  │   │ state machine │   │ TableBackend   │   │ AppConfig    │   │   │
//! │  │   │ load sharing  │   │ custom ops     │   │ (config.rs)  │   │   │
//! │  │   └───────────────┘   └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  meridian-db RecordStore (SqliteStore / MemoryStore)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`cache`] - `ResourceCache`, load states, backend and operation traits
//! - [`contexts`] - One context per entity, bound to its table
//! - [`app`] - `AppContext`, the object screens receive
//! - [`config`] - `AppConfig` from TOML and environment
//! - [`telemetry`] - Tracing subscriber setup
//! - [`error`] - Cache error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meridian_cache::{AppConfig, AppContext};
//!
//! let config = AppConfig::load(None)?;
//! let app = AppContext::open(&config).await?;
//! app.start().await;
//!
//! app.customers.mount().await?;
//! let customer = app.customers.create(Customer::new("Ada")).await?;
//! app.customers.adjust_points(&customer.id, 120).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod app;
pub mod cache;
pub mod config;
pub mod contexts;
pub mod error;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use app::AppContext;
pub use cache::{
    AsyncState, CustomOperation, MissingEntityPolicy, OperationScope, Resource, ResourceBackend,
    ResourceCache, ResourceCacheBuilder, Snapshot,
};
pub use config::{AppConfig, ResourceSettings};
pub use contexts::{
    CustomersContext, ProductsContext, PurchaseOrdersContext, StoredEntity, StoresContext,
    SuppliersContext, TableBackend,
};
pub use error::{CacheError, CacheResult};
