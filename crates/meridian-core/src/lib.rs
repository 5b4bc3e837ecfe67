//! # meridian-core: Pure Domain Logic for Meridian POS
//!
//! This crate holds the domain model shared by every layer: the entities the
//! back office manages, their patch types, money, validation and the derived
//! views the UI renders from cached collections. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Meridian POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     UI (screens, dialogs)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ items / async state / operations       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          meridian-cache (Resource Contexts, AppContext)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ meridian-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   views   │  │ validation│  │   │
//! │  │   │ Customer  │  │   Money   │  │ low_stock │  │   rules   │  │   │
//! │  │   │ Product…  │  │           │  │ effective │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               meridian-db (RecordStore, SQLite)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Customer, Product, Store, Supplier, PurchaseOrder) and patches
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`views`] - Read-only projections over entity collections
//!
//! ## Example Usage
//!
//! ```rust
//! use meridian_core::{views, Product};
//!
//! let mut product = Product::new("COKE-330", "Coca-Cola 330ml", 199);
//! product.stock = 40;
//! product.stock_by_store.insert("downtown".to_string(), 3);
//!
//! assert_eq!(views::effective_stock(&product, Some("downtown")), 3);
//! assert_eq!(views::effective_stock(&product, Some("airport")), 40);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;
pub mod views;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default low-stock threshold used when a product carries none of its own.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum quantity on a single purchase order line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 10000 instead of 100).
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Generates a new entity identifier (UUID v4).
///
/// ## Why UUID v4?
/// Globally unique without coordination, so records can be created offline
/// before the backend confirms them.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
