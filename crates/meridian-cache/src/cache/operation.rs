//! # Custom Operations
//!
//! Domain operations layered on a cache (adjust loyalty points, receive a
//! purchase order, ...). An operation reads the current items and expresses
//! its effect as an `update`; it never touches the collection directly, so
//! it inherits the confirm-first rule.

use async_trait::async_trait;

use super::{Resource, ResourceCache};
use crate::error::{CacheError, CacheResult};

#[async_trait]
pub trait CustomOperation<T: Resource>: Send + Sync {
    type Output: Send;

    /// Name used in log events.
    fn name(&self) -> &'static str;

    async fn run(&self, scope: OperationScope<'_, T>) -> CacheResult<Self::Output>;
}

/// The part of a cache a custom operation may use.
pub struct OperationScope<'a, T: Resource> {
    cache: &'a ResourceCache<T>,
}

impl<'a, T: Resource> OperationScope<'a, T> {
    pub(super) fn new(cache: &'a ResourceCache<T>) -> Self {
        OperationScope { cache }
    }

    pub fn resource(&self) -> &str {
        self.cache.name()
    }

    pub fn items(&self) -> std::sync::Arc<Vec<T>> {
        self.cache.items()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.cache.get(id)
    }

    /// Like [`get`](Self::get), failing with `NotFound` when absent.
    pub fn require(&self, id: &str) -> CacheResult<T> {
        self.get(id).ok_or_else(|| CacheError::NotFound {
            resource: self.resource().to_string(),
            id: id.to_string(),
        })
    }

    pub async fn update(&self, id: &str, patch: T::Patch) -> CacheResult<T> {
        self.cache.update(id, patch).await
    }
}
