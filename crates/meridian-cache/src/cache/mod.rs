//! # Async Resource Cache
//!
//! One in-memory collection of entities kept in step with an asynchronous,
//! failure-prone backend. Every resource context (customers, products, ...)
//! is an instance of [`ResourceCache`].
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ResourceCache<T>                                 │
//! │                                                                         │
//! │  mount() / refresh()                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────┐  in flight?  ┌──────────────────────────────┐    │
//! │  │ in_flight (Mutex)│─────yes─────►│ await the same Shared future │    │
//! │  └────────┬─────────┘              └──────────────────────────────┘    │
//! │           │ no                                                          │
//! │           ▼                                                             │
//! │  state = Loading ──► backend.load_all() ──► Ready  + items replaced    │
//! │                                         └─► Error  + items kept        │
//! │                                                                         │
//! │  create / update / remove                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate ──► backend call ──ok──► apply confirmed value to items      │
//! │                     └──err──► MutationFailed, items untouched          │
//! │                                                                         │
//! │  every change ──► watch::Sender<Snapshot<T>> ──► subscribers           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Confirm-First
//! Items only ever hold what the backend confirmed. Nothing is applied
//! optimistically, so a failed call needs no rollback.
//!
//! ## Mutations During a Load
//! Allowed. A load that started before a create may finish after it and
//! replace the items with a collection lacking the new entity; the next
//! load brings it back.

mod operation;
mod resource;
mod state;

pub use operation::{CustomOperation, OperationScope};
pub use resource::{BackendError, MissingEntityPolicy, Resource, ResourceBackend};
pub use state::{AsyncState, Snapshot};

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{CacheError, CacheResult};

type SharedLoad = Shared<BoxFuture<'static, CacheResult<()>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadMode {
    /// Reload regardless of state.
    Always,
    /// Load only if nothing was ever requested.
    IfIdle,
}

// =============================================================================
// Resource Cache
// =============================================================================

/// Shared handle to one resource collection. Clones share state.
pub struct ResourceCache<T: Resource> {
    inner: Arc<Inner<T>>,
}

struct Inner<T: Resource> {
    name: String,
    lazy: bool,
    on_missing: MissingEntityPolicy,
    backend: Arc<dyn ResourceBackend<T>>,
    snapshot: watch::Sender<Snapshot<T>>,
    /// The outstanding load, if any. Never locked across an await.
    in_flight: Mutex<Option<SharedLoad>>,
}

impl<T: Resource> Clone for ResourceCache<T> {
    fn clone(&self) -> Self {
        ResourceCache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Resource> fmt::Debug for ResourceCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("name", &self.inner.name)
            .field("lazy", &self.inner.lazy)
            .field("state", &self.async_state())
            .field("items", &self.len())
            .finish()
    }
}

impl<T: Resource> ResourceCache<T> {
    pub fn builder(
        name: impl Into<String>,
        backend: Arc<dyn ResourceBackend<T>>,
    ) -> ResourceCacheBuilder<T> {
        ResourceCacheBuilder {
            name: name.into(),
            backend,
            lazy: true,
            on_missing: MissingEntityPolicy::default(),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_lazy(&self) -> bool {
        self.inner.lazy
    }

    /// Current items. Cheap: the collection is shared, not copied.
    pub fn items(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.inner.snapshot.borrow().items)
    }

    pub fn async_state(&self) -> AsyncState {
        self.inner.snapshot.borrow().state.clone()
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.inner
            .snapshot
            .borrow()
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.snapshot.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receives a new [`Snapshot`] after every change to items or state.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.inner.snapshot.subscribe()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Called when a consumer starts using the cache.
    ///
    /// Loads if nothing was requested yet, joins a load already in flight,
    /// and otherwise returns at once. An `Error` state is left for an
    /// explicit [`refresh`](Self::refresh).
    pub async fn mount(&self) -> CacheResult<()> {
        self.load(LoadMode::IfIdle).await
    }

    /// Reloads from the backend, whatever the current state.
    ///
    /// Still shares a load already in flight instead of starting another.
    pub async fn refresh(&self) -> CacheResult<()> {
        self.load(LoadMode::Always).await
    }

    /// Starts the initial load of an eager cache. No-op for lazy caches.
    pub async fn initialize(&self) -> CacheResult<()> {
        if self.inner.lazy {
            return Ok(());
        }
        self.load(LoadMode::IfIdle).await
    }

    async fn load(&self, mode: LoadMode) -> CacheResult<()> {
        let load = {
            let mut in_flight = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            if let Some(load) = in_flight.as_ref() {
                debug!(resource = %self.inner.name, "Joining in-flight load");
                load.clone()
            } else if mode == LoadMode::IfIdle
                && self.inner.snapshot.borrow().state != AsyncState::Idle
            {
                return Ok(());
            } else {
                let load = Arc::clone(&self.inner).run_load().boxed().shared();
                *in_flight = Some(load.clone());
                self.inner
                    .snapshot
                    .send_modify(|snapshot| snapshot.state = AsyncState::Loading);
                load
            }
        };

        load.await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates `item` in the backend and appends the confirmed entity.
    pub async fn create(&self, item: T) -> CacheResult<T> {
        item.validate()?;
        debug!(resource = %self.inner.name, id = %item.id(), "Creating");

        let created = self
            .inner
            .backend
            .create(item)
            .await
            .map_err(|err| self.mutation_failed("create", err))?;

        self.inner.snapshot.send_modify(|snapshot| {
            Arc::make_mut(&mut snapshot.items).push(created.clone());
        });

        Ok(created)
    }

    /// Applies `patch` in the backend and replaces the local entity with
    /// the merged value the backend returned.
    ///
    /// The backend is called even if `id` isn't in the cache; what happens
    /// locally then is decided by the [`MissingEntityPolicy`].
    pub async fn update(&self, id: &str, patch: T::Patch) -> CacheResult<T> {
        T::validate_patch(&patch)?;
        debug!(resource = %self.inner.name, id = %id, "Updating");

        let updated = self
            .inner
            .backend
            .update(id, patch)
            .await
            .map_err(|err| self.mutation_failed("update", err))?;

        let replaced = self.inner.snapshot.send_if_modified(|snapshot| {
            match snapshot.items.iter().position(|item| item.id() == id) {
                Some(index) => {
                    Arc::make_mut(&mut snapshot.items)[index] = updated.clone();
                    true
                }
                None => false,
            }
        });

        if !replaced {
            self.missing_entity("update", id).await;
        }

        Ok(updated)
    }

    /// Removes `id` from the backend, then from the cache.
    pub async fn remove(&self, id: &str) -> CacheResult<()> {
        debug!(resource = %self.inner.name, id = %id, "Removing");

        self.inner
            .backend
            .remove(id)
            .await
            .map_err(|err| self.mutation_failed("remove", err))?;

        let removed = self.inner.snapshot.send_if_modified(|snapshot| {
            if snapshot.items.iter().any(|item| item.id() == id) {
                Arc::make_mut(&mut snapshot.items).retain(|item| item.id() != id);
                true
            } else {
                false
            }
        });

        if !removed {
            self.missing_entity("remove", id).await;
        }

        Ok(())
    }

    /// Runs a domain operation against this cache.
    pub async fn execute<O>(&self, operation: O) -> CacheResult<O::Output>
    where
        O: CustomOperation<T>,
    {
        debug!(
            resource = %self.inner.name,
            operation = operation.name(),
            "Running custom operation"
        );
        operation.run(OperationScope::new(self)).await
    }

    fn mutation_failed(&self, operation: &'static str, err: BackendError) -> CacheError {
        let message = err.to_string();
        warn!(
            resource = %self.inner.name,
            operation,
            error = %message,
            "Backend rejected mutation, cache unchanged"
        );
        CacheError::MutationFailed {
            resource: self.inner.name.clone(),
            operation,
            message,
        }
    }

    async fn missing_entity(&self, operation: &'static str, id: &str) {
        match self.inner.on_missing {
            MissingEntityPolicy::Ignore => {
                warn!(
                    resource = %self.inner.name,
                    operation,
                    id = %id,
                    "Backend confirmed a change to an id the cache doesn't hold"
                );
            }
            MissingEntityPolicy::Refresh => {
                warn!(
                    resource = %self.inner.name,
                    operation,
                    id = %id,
                    "Cache diverged from backend, reloading"
                );
                if let Err(err) = self.refresh().await {
                    warn!(resource = %self.inner.name, error = %err, "Reload after divergence failed");
                }
            }
        }
    }
}

impl<T: Resource> Inner<T> {
    async fn run_load(self: Arc<Self>) -> CacheResult<()> {
        debug!(resource = %self.name, "Loading from backend");
        let result = self.backend.load_all().await;

        // State change and token release happen together so a caller never
        // sees Ready while a finished load is still joinable.
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *in_flight = None;

        match result {
            Ok(items) => {
                let count = items.len();
                self.snapshot.send_modify(|snapshot| {
                    snapshot.items = Arc::new(items);
                    snapshot.state = AsyncState::Ready;
                });
                info!(resource = %self.name, count, "Resource loaded");
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                warn!(
                    resource = %self.name,
                    error = %message,
                    "Load failed, keeping previous items"
                );
                self.snapshot
                    .send_modify(|snapshot| snapshot.state = AsyncState::Error(message.clone()));
                Err(CacheError::LoadFailed {
                    resource: self.name.clone(),
                    message,
                })
            }
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`ResourceCache`]. Caches are lazy unless told otherwise.
pub struct ResourceCacheBuilder<T: Resource> {
    name: String,
    backend: Arc<dyn ResourceBackend<T>>,
    lazy: bool,
    on_missing: MissingEntityPolicy,
}

impl<T: Resource> ResourceCacheBuilder<T> {
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    pub fn on_missing(mut self, policy: MissingEntityPolicy) -> Self {
        self.on_missing = policy;
        self
    }

    pub fn build(self) -> ResourceCache<T> {
        let (snapshot, _) = watch::channel(Snapshot::empty());
        debug!(resource = %self.name, lazy = self.lazy, "Resource cache created");

        ResourceCache {
            inner: Arc::new(Inner {
                name: self.name,
                lazy: self.lazy,
                on_missing: self.on_missing,
                backend: self.backend,
                snapshot,
                in_flight: Mutex::new(None),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meridian_core::validation::{validate_non_negative, ValidationResult};
    use meridian_core::Identified;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        value: i64,
    }

    fn item(id: &str, value: i64) -> Item {
        Item {
            id: id.to_string(),
            value,
        }
    }

    impl Identified for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    #[derive(Debug, Clone, Default)]
    struct ItemPatch {
        value: Option<i64>,
    }

    impl Resource for Item {
        type Patch = ItemPatch;

        fn validate(&self) -> ValidationResult<()> {
            validate_non_negative("value", self.value)
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        rows: Mutex<Vec<Item>>,
        gate: Option<Arc<Notify>>,
        fail_loads: AtomicBool,
        fail_mutations: AtomicBool,
        loads: AtomicUsize,
        creates: AtomicUsize,
        updates: AtomicUsize,
    }

    impl FakeBackend {
        fn with_rows(rows: Vec<Item>) -> Self {
            FakeBackend {
                rows: Mutex::new(rows),
                ..Default::default()
            }
        }

        fn push(&self, row: Item) {
            self.rows.lock().unwrap().push(row);
        }
    }

    #[async_trait]
    impl ResourceBackend<Item> for FakeBackend {
        async fn load_all(&self) -> Result<Vec<Item>, BackendError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_loads.load(Ordering::SeqCst) {
                return Err("backend offline".into());
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn create(&self, item: Item) -> Result<Item, BackendError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err("write refused".into());
            }
            self.rows.lock().unwrap().push(item.clone());
            Ok(item)
        }

        async fn update(&self, id: &str, patch: ItemPatch) -> Result<Item, BackendError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err("write refused".into());
            }
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|row| row.id == id)
                .ok_or_else(|| format!("no row {id}"))?;
            if let Some(value) = patch.value {
                row.value = value;
            }
            Ok(row.clone())
        }

        async fn remove(&self, id: &str) -> Result<(), BackendError> {
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err("write refused".into());
            }
            self.rows.lock().unwrap().retain(|row| row.id != id);
            Ok(())
        }
    }

    fn cache(backend: &Arc<FakeBackend>) -> ResourceCache<Item> {
        ResourceCache::<Item>::builder("items", backend.clone()).build()
    }

    #[tokio::test]
    async fn test_lazy_cache_loads_on_first_mount() {
        let backend = Arc::new(FakeBackend::with_rows(vec![item("1", 10)]));
        let cache = cache(&backend);

        assert_eq!(cache.async_state(), AsyncState::Idle);
        assert!(cache.is_empty());
        cache.initialize().await.unwrap();
        assert_eq!(backend.loads.load(Ordering::SeqCst), 0);

        cache.mount().await.unwrap();
        assert_eq!(cache.async_state(), AsyncState::Ready);
        assert_eq!(*cache.items(), vec![item("1", 10)]);

        cache.mount().await.unwrap();
        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_eager_cache_loads_on_initialize() {
        let backend = Arc::new(FakeBackend::with_rows(vec![item("1", 10)]));
        let cache = ResourceCache::<Item>::builder("items", backend.clone())
            .lazy(false)
            .build();

        cache.initialize().await.unwrap();
        assert!(cache.async_state().is_ready());
        assert_eq!(cache.len(), 1);

        // A mount after the eager load doesn't reload
        cache.mount().await.unwrap();
        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_share_one_load() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(FakeBackend {
            rows: Mutex::new(vec![item("1", 10)]),
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let cache = cache(&backend);

        let (first, second, mounted, _) = tokio::join!(
            cache.refresh(),
            cache.refresh(),
            cache.mount(),
            async {
                assert!(cache.async_state().is_loading());
                gate.notify_one();
            }
        );

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert!(mounted.is_ok());
        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.async_state(), AsyncState::Ready);
    }

    #[tokio::test]
    async fn test_create_during_load_keeps_loading_until_load_resolves() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(FakeBackend {
            rows: Mutex::new(vec![item("1", 10)]),
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let cache = cache(&backend);

        let (refreshed, _) = tokio::join!(cache.refresh(), async {
            assert!(cache.async_state().is_loading());

            let created = cache.create(item("2", 20)).await.unwrap();
            assert_eq!(created, item("2", 20));
            assert!(cache.async_state().is_loading());
            assert_eq!(*cache.items(), vec![item("2", 20)]);

            let updated = cache
                .update("2", ItemPatch { value: Some(21) })
                .await
                .unwrap();
            assert_eq!(updated, item("2", 21));
            assert!(cache.async_state().is_loading());
            assert_eq!(*cache.items(), vec![item("2", 21)]);

            // Another writer replaces the table before the load reads it
            *backend.rows.lock().unwrap() = vec![item("1", 11)];
            gate.notify_one();
        });

        refreshed.unwrap();
        assert_eq!(cache.async_state(), AsyncState::Ready);
        // The load result wins over the locally applied create
        assert_eq!(*cache.items(), vec![item("1", 11)]);
        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_items() {
        let backend = Arc::new(FakeBackend::with_rows(vec![item("1", 10)]));
        let cache = cache(&backend);
        cache.mount().await.unwrap();

        backend.fail_loads.store(true, Ordering::SeqCst);
        let err = cache.refresh().await.unwrap_err();
        assert_eq!(
            err,
            CacheError::LoadFailed {
                resource: "items".into(),
                message: "backend offline".into(),
            }
        );
        assert_eq!(cache.async_state(), AsyncState::Error("backend offline".into()));
        assert_eq!(*cache.items(), vec![item("1", 10)]);

        // Error isn't retried by mount, only by refresh
        cache.mount().await.unwrap();
        assert_eq!(backend.loads.load(Ordering::SeqCst), 2);

        backend.fail_loads.store(false, Ordering::SeqCst);
        backend.push(item("2", 5));
        cache.refresh().await.unwrap();
        assert_eq!(cache.async_state(), AsyncState::Ready);
        assert_eq!(*cache.items(), vec![item("1", 10), item("2", 5)]);
    }

    #[tokio::test]
    async fn test_create_update_remove_apply_confirmed_values() {
        let backend = Arc::new(FakeBackend::with_rows(vec![item("1", 10)]));
        let cache = cache(&backend);
        cache.mount().await.unwrap();

        let created = cache.create(item("2", 5)).await.unwrap();
        assert_eq!(created, item("2", 5));
        assert_eq!(*cache.items(), vec![item("1", 10), item("2", 5)]);

        let updated = cache
            .update("1", ItemPatch { value: Some(11) })
            .await
            .unwrap();
        assert_eq!(updated, item("1", 11));
        assert_eq!(cache.get("1"), Some(item("1", 11)));

        cache.remove("1").await.unwrap();
        assert_eq!(*cache.items(), vec![item("2", 5)]);

        // Mutations leave the load state alone
        assert_eq!(cache.async_state(), AsyncState::Ready);
    }

    #[tokio::test]
    async fn test_failed_mutations_leave_cache_unchanged() {
        let backend = Arc::new(FakeBackend::with_rows(vec![item("1", 10)]));
        let cache = cache(&backend);
        cache.mount().await.unwrap();
        backend.fail_mutations.store(true, Ordering::SeqCst);

        let err = cache.create(item("2", 5)).await.unwrap_err();
        assert!(matches!(
            err,
            CacheError::MutationFailed { operation: "create", .. }
        ));

        let err = cache
            .update("1", ItemPatch { value: Some(0) })
            .await
            .unwrap_err();
        assert!(err.is_backend_failure());

        assert!(cache.remove("1").await.is_err());
        assert_eq!(*cache.items(), vec![item("1", 10)]);
        assert_eq!(cache.async_state(), AsyncState::Ready);
    }

    #[tokio::test]
    async fn test_invalid_create_never_reaches_backend() {
        let backend = Arc::new(FakeBackend::default());
        let cache = cache(&backend);

        let err = cache.create(item("x", -1)).await.unwrap_err();
        assert!(matches!(err, CacheError::Invalid(_)));
        assert_eq!(backend.creates.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_update_of_uncached_id_still_calls_backend() {
        let backend = Arc::new(FakeBackend::with_rows(vec![item("1", 10)]));
        let cache = cache(&backend);

        // Never loaded: the cache doesn't know "1"
        let updated = cache
            .update("1", ItemPatch { value: Some(20) })
            .await
            .unwrap();

        assert_eq!(updated, item("1", 20));
        assert_eq!(backend.updates.load(Ordering::SeqCst), 1);
        assert!(cache.is_empty());
        assert_eq!(cache.async_state(), AsyncState::Idle);
    }

    #[tokio::test]
    async fn test_refresh_policy_reloads_after_divergence() {
        let backend = Arc::new(FakeBackend::with_rows(vec![item("1", 10)]));
        let cache = ResourceCache::<Item>::builder("items", backend.clone())
            .on_missing(MissingEntityPolicy::Refresh)
            .build();
        cache.mount().await.unwrap();

        // Created behind the cache's back
        backend.push(item("2", 1));
        cache.update("2", ItemPatch { value: Some(2) }).await.unwrap();

        assert_eq!(backend.loads.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get("2"), Some(item("2", 2)));
    }

    #[tokio::test]
    async fn test_remove_of_uncached_id_is_a_local_no_op() {
        let backend = Arc::new(FakeBackend::with_rows(vec![item("1", 10)]));
        let cache = cache(&backend);
        cache.mount().await.unwrap();

        cache.remove("zzz").await.unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_every_change() {
        let backend = Arc::new(FakeBackend::with_rows(vec![item("1", 10)]));
        let cache = cache(&backend);
        let mut rx = cache.subscribe();

        cache.mount().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().state, AsyncState::Ready);

        cache.create(item("2", 5)).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().items.len(), 2);

        // No local change, no notification
        cache.remove("zzz").await.unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    struct Double {
        id: String,
    }

    #[async_trait]
    impl CustomOperation<Item> for Double {
        type Output = Item;

        fn name(&self) -> &'static str {
            "double"
        }

        async fn run(&self, scope: OperationScope<'_, Item>) -> CacheResult<Item> {
            let current = scope.require(&self.id)?;
            scope
                .update(&self.id, ItemPatch { value: Some(current.value * 2) })
                .await
        }
    }

    #[tokio::test]
    async fn test_custom_operation_goes_through_update() {
        let backend = Arc::new(FakeBackend::with_rows(vec![item("1", 10)]));
        let cache = cache(&backend);
        cache.mount().await.unwrap();

        let doubled = cache.execute(Double { id: "1".into() }).await.unwrap();
        assert_eq!(doubled, item("1", 20));
        assert_eq!(cache.get("1"), Some(item("1", 20)));
        assert_eq!(backend.updates.load(Ordering::SeqCst), 1);

        let err = cache.execute(Double { id: "9".into() }).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(backend.updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let backend = Arc::new(FakeBackend::with_rows(vec![item("1", 10)]));
        let cache = cache(&backend);
        let other = cache.clone();

        other.mount().await.unwrap();
        assert_eq!(cache.len(), 1);
        assert!(format!("{cache:?}").contains("items"));
    }
}
