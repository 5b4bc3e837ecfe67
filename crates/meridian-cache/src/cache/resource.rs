//! # Resources and Backends
//!
//! What the cache needs from an entity type and from its persistence.

use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use meridian_core::validation::ValidationResult;
use meridian_core::Identified;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Error type a backend reports. The cache only keeps its message.
pub type BackendError = Box<dyn StdError + Send + Sync>;

/// An entity type a [`super::ResourceCache`] can hold.
///
/// The cache only inspects the id. The hooks run before any backend call
/// and default to accepting everything.
pub trait Resource: Identified + Clone + Send + Sync + 'static {
    /// Partial update: every field optional, the id never included.
    type Patch: Send + Sync + 'static;

    fn validate(&self) -> ValidationResult<()> {
        Ok(())
    }

    fn validate_patch(_patch: &Self::Patch) -> ValidationResult<()> {
        Ok(())
    }
}

/// Persistence strategy injected into a cache.
///
/// `update` returns the merged entity as the backend stored it; the cache
/// replaces its local copy with exactly that value.
#[async_trait]
pub trait ResourceBackend<T: Resource>: Send + Sync {
    async fn load_all(&self) -> Result<Vec<T>, BackendError>;

    async fn create(&self, item: T) -> Result<T, BackendError>;

    async fn update(&self, id: &str, patch: T::Patch) -> Result<T, BackendError>;

    async fn remove(&self, id: &str) -> Result<(), BackendError>;
}

/// What to do when a confirmed update/remove targets an id the cache
/// doesn't hold.
///
/// ```text
/// backend.update("x") ✓ ──► "x" in items? ──yes──► replace
///                                  │
///                                  no
///                                  ├── Ignore  : warn!, items unchanged
///                                  └── Refresh : warn!, reload from backend
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingEntityPolicy {
    #[default]
    Ignore,
    Refresh,
}

impl fmt::Display for MissingEntityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingEntityPolicy::Ignore => write!(f, "ignore"),
            MissingEntityPolicy::Refresh => write!(f, "refresh"),
        }
    }
}

impl FromStr for MissingEntityPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ignore" => Ok(MissingEntityPolicy::Ignore),
            "refresh" | "reload" => Ok(MissingEntityPolicy::Refresh),
            other => Err(CacheError::Config(format!(
                "Unknown missing-entity policy: '{}'. Valid options: ignore, refresh",
                other
            ))),
        }
    }
}
