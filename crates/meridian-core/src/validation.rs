//! # Validation Module
//!
//! Input validation for entities and patches before they reach a backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (UI)                                                    │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Resource Cache create/update                                 │
//! │  └── THIS MODULE: entity.validate() / patch.validate()                 │
//! │      A rejected input never reaches the backend                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Record store                                                 │
//! │  └── PRIMARY KEY (collection, id)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use meridian_core::validation::{validate_sku, validate_email};
//!
//! assert!(validate_sku("COKE-330").is_ok());
//! assert!(validate_email("ana@example.com").is_ok());
//! ```

use crate::error::ValidationError;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name (customer, product, store, supplier).
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use meridian_core::validation::validate_sku;
///
/// assert!(validate_sku("COKE-330").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// Deliberately loose: one `@`, a non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    let email = email.trim();
    let (local, domain) = email.split_once('@').ok_or_else(|| invalid("missing @"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must look like name@domain"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must contain a dot"));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an amount in cents (price or cost). Zero is allowed.
pub fn validate_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a stock level or loyalty balance (non-negative).
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a purchase order line quantity.
///
/// ## Rules
/// - Must be between 1 and [`MAX_LINE_QUANTITY`]
pub fn validate_line_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_LINE_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates that a reference to another entity is present.
pub fn validate_reference(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Applies a signed `delta` to a stock level or loyalty balance.
///
/// Fails with `OutOfRange` instead of overflowing.
pub fn apply_delta(field: &str, current: i64, delta: i64) -> ValidationResult<i64> {
    current
        .checked_add(delta)
        .ok_or_else(|| ValidationError::OutOfRange {
            field: field.to_string(),
            min: i64::MIN,
            max: i64::MAX,
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("COKE-330").is_ok());
        assert!(validate_sku("product_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Downtown Branch").is_ok());
        assert!(validate_name("name", "  ").is_err());
        assert!(validate_name("name", &"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("ana.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@localhost").is_err());
        assert!(validate_email("ana@a@b.com").is_err());
    }

    #[test]
    fn test_validate_line_quantity() {
        assert!(validate_line_quantity(1).is_ok());
        assert!(validate_line_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_line_quantity(0).is_err());
        assert!(validate_line_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_cents() {
        assert!(validate_cents("price_cents", 0).is_ok());
        assert!(validate_cents("price_cents", 1099).is_ok());
        assert_eq!(
            validate_cents("price_cents", -1),
            Err(ValidationError::Negative {
                field: "price_cents".to_string()
            })
        );
    }

    #[test]
    fn test_apply_delta() {
        assert_eq!(apply_delta("stock", 10, -3), Ok(7));
        assert_eq!(apply_delta("stock", 0, -3), Ok(-3));
        assert!(apply_delta("loyalty_points", 10, i64::MAX).is_err());
        assert!(apply_delta("stock", -1, i64::MIN).is_err());
    }
}
