//! # Error Types
//!
//! Domain-specific error types for meridian-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  meridian-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  meridian-db errors (separate crate)                                   │
//! │  └── DbError          - Record store failures                          │
//! │                                                                         │
//! │  meridian-cache errors                                                 │
//! │  └── CacheError       - What the UI sees (load / mutation failures)    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CacheError → UI                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, ID, etc.)
//! 3. Errors are `Clone` so a shared outcome can reach every waiting caller

use thiserror::Error;

use crate::types::PurchaseOrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Raised by custom operations before they hand a patch to the cache, so a
/// rejected rule never reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Loyalty balance would go below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Redeem 500 points
    ///      │
    ///      ▼
    /// Check balance: available=320
    ///      │
    ///      ▼
    /// InsufficientPoints { customer_id, available: 320, requested: 500 }
    ///      │
    ///      ▼
    /// UI shows: "Customer only has 320 points"
    /// ```
    #[error("Insufficient loyalty points for {customer_id}: available {available}, requested {requested}")]
    InsufficientPoints {
        customer_id: String,
        available: i64,
        requested: i64,
    },

    /// Stock adjustment would leave a negative quantity.
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Purchase order cannot move to the requested status.
    #[error("Purchase order {order_id} cannot move from {from:?} to {to:?}")]
    InvalidStatusTransition {
        order_id: String,
        from: PurchaseOrderStatus,
        to: PurchaseOrderStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any backend call runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
