//! # meridian-db: Record Store for Meridian POS
//!
//! This crate provides the persistence backend the resource cache talks to.
//! It stores schemaless JSON records grouped by table and exposes exactly
//! four operations: full-table load, insert, partial update, remove.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Meridian POS Data Flow                            │
//! │                                                                         │
//! │  ResourceCache<Customer>::create(customer)                             │
//! │       │                                                                 │
//! │       ▼  TableBackend maps Customer → Record                           │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   meridian-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  RecordStore  │    │  SqliteStore  │    │  Migrations  │  │   │
//! │  │   │  (store.rs)   │◄───│  (sqlite.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │  load_all     │◄───│  MemoryStore  │    │ 001_init.sql │  │   │
//! │  │   │  insert       │    │  (memory.rs)  │    │              │  │   │
//! │  │   │  update/remove│    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL mode)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `RecordStore` trait and record helpers
//! - [`pool`] - Connection pool creation and configuration
//! - [`sqlite`] - SQLite-backed `RecordStore`
//! - [`memory`] - In-memory `RecordStore`
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meridian_db::{Database, DbConfig, RecordStore, SqliteStore};
//!
//! let db = Database::new(DbConfig::new("path/to/meridian.db")).await?;
//! let store = SqliteStore::new(db);
//! let customers = store.load_all("customers").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod sqlite;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig};
pub use sqlite::SqliteStore;
pub use store::{Record, RecordStore};
