//! # Database Error Types
//!
//! Error types for record store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error) / serde_json::Error                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CacheError (meridian-cache) ← LoadFailed / MutationFailed             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UI displays the message                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Record store errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Record not found.
    ///
    /// ## When This Occurs
    /// - `update` / `remove` on an id the table doesn't hold
    #[error("{table} record not found: {id}")]
    NotFound { table: String, id: String },

    /// A record with this id already exists in the table.
    #[error("Duplicate {table} record: '{id}' already exists")]
    UniqueViolation { table: String, id: String },

    /// The record has no string `id` field.
    #[error("{table} record is missing a string `id` field")]
    MissingId { table: String },

    /// Stored JSON could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Pool closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given table and ID.
    pub fn not_found(table: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            table: table.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(table: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            table: table.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: records.collection, records.id"
                if msg.contains("UNIQUE constraint failed") {
                    DbError::UniqueViolation {
                        table: "records".to_string(),
                        id: "unknown".to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DbError::not_found("customers", "c-1").to_string(),
            "customers record not found: c-1"
        );
        assert_eq!(
            DbError::duplicate("products", "p-1").to_string(),
            "Duplicate products record: 'p-1' already exists"
        );
        assert!(DbError::not_found("t", "x").is_not_found());
        assert!(!DbError::PoolExhausted.is_not_found());
    }
}
