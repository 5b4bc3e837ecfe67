//! # Cache Error Types
//!
//! Every failure a consumer of a resource context can observe.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where Each Error Comes From                          │
//! │                                                                         │
//! │  backend.load_all() fails ──► LoadFailed      + AsyncState::Error      │
//! │  backend.create/update/remove fails ──► MutationFailed (cache as-is)   │
//! │  custom op target not in items ──► NotFound                            │
//! │  validate / validate_patch ──► Invalid        (backend never called)   │
//! │  business rule (points, stock, status) ──► Rejected                    │
//! │  meridian.toml / env ──► Config                                        │
//! │  opening the SQLite store ──► Storage                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `CacheError` is `Clone`: a shared load hands the same outcome to every
//! caller awaiting it.

use meridian_core::{CoreError, ValidationError};
use meridian_db::DbError;
use thiserror::Error;

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backend's `load_all` failed.
    ///
    /// ## When This Occurs
    /// - Mount or refresh while the store is unavailable
    ///
    /// Items keep their previous value; the state becomes `Error(message)`.
    #[error("Failed to load {resource}: {message}")]
    LoadFailed { resource: String, message: String },

    /// A backend create/update/remove failed. The cache is unchanged.
    #[error("Failed to {operation} {resource}: {message}")]
    MutationFailed {
        resource: String,
        operation: &'static str,
        message: String,
    },

    /// A custom operation targeted an id that isn't in the cache.
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Input rejected before reaching the backend.
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationError),

    /// A business rule refused the operation.
    #[error("{0}")]
    Rejected(#[from] CoreError),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The record store could not be opened.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CacheError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }

    /// True for failures reported by the backend (as opposed to input or
    /// rule checks done locally).
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            CacheError::LoadFailed { .. } | CacheError::MutationFailed { .. }
        )
    }
}

impl From<DbError> for CacheError {
    fn from(err: DbError) -> Self {
        CacheError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for CacheError {
    fn from(err: toml::de::Error) -> Self {
        CacheError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::MutationFailed {
            resource: "customers".into(),
            operation: "update",
            message: "disk full".into(),
        };
        assert_eq!(err.to_string(), "Failed to update customers: disk full");
        assert!(err.is_backend_failure());

        let err = CacheError::NotFound {
            resource: "products".into(),
            id: "p-1".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_backend_failure());
    }

    #[test]
    fn test_conversions() {
        let err: CacheError = ValidationError::Negative {
            field: "stock".into(),
        }
        .into();
        assert!(matches!(err, CacheError::Invalid(_)));

        let err: CacheError = DbError::PoolExhausted.into();
        assert!(matches!(err, CacheError::Storage(_)));
    }
}
