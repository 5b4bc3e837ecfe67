//! End-to-end behavior of a table-backed cache over in-memory SQLite.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use meridian_cache::{
    AppConfig, AppContext, AsyncState, CacheError, CustomersContext, MissingEntityPolicy,
    Resource, ResourceCache, ResourceSettings, StoredEntity, TableBackend,
};
use meridian_core::{Customer, CustomerPatch, Identified};
use meridian_db::{Database, DbConfig, DbResult, Record, RecordStore, SqliteStore};
use serde::{Deserialize, Serialize};
use serde_json::json;

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Counter {
    id: String,
    value: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
struct CounterPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<i64>,
}

impl Identified for Counter {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for Counter {
    type Patch = CounterPatch;
}

impl StoredEntity for Counter {
    const TABLE: &'static str = "counters";
    type Record = Counter;
    type PatchRecord = CounterPatch;
}

fn counter(id: &str, value: i64) -> Counter {
    Counter {
        id: id.to_string(),
        value,
    }
}

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        _ => unreachable!("fixture records are objects"),
    }
}

/// Counts full-table loads and yields before each one, so concurrent
/// callers always overlap.
struct CountingStore {
    inner: SqliteStore,
    loads: AtomicUsize,
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn load_all(&self, table: &str) -> DbResult<Vec<Record>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.inner.load_all(table).await
    }

    async fn insert(&self, table: &str, record: Record) -> DbResult<Record> {
        self.inner.insert(table, record).await
    }

    async fn update(&self, table: &str, id: &str, partial: Record) -> DbResult<Record> {
        self.inner.update(table, id, partial).await
    }

    async fn remove(&self, table: &str, id: &str) -> DbResult<()> {
        self.inner.remove(table, id).await
    }
}

async fn sqlite_store() -> Arc<CountingStore> {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    Arc::new(CountingStore {
        inner: SqliteStore::new(db),
        loads: AtomicUsize::new(0),
    })
}

fn counters(store: Arc<CountingStore>, policy: MissingEntityPolicy) -> ResourceCache<Counter> {
    ResourceCache::<Counter>::builder(Counter::TABLE, Arc::new(TableBackend::<Counter>::new(store)))
        .on_missing(policy)
        .build()
}

fn values(cache: &ResourceCache<Counter>) -> Vec<(String, i64)> {
    cache
        .items()
        .iter()
        .map(|c| (c.id.clone(), c.value))
        .collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn lazy_mount_then_create_then_remove() {
    let store = sqlite_store().await;
    store
        .insert("counters", record(json!({ "id": "1", "value": 10 })))
        .await
        .unwrap();

    let cache = counters(store.clone(), MissingEntityPolicy::Ignore);
    assert!(cache.is_empty());
    assert_eq!(cache.async_state(), AsyncState::Idle);

    cache.mount().await.unwrap();
    assert_eq!(cache.async_state(), AsyncState::Ready);
    assert_eq!(cache.items().as_slice(), &[counter("1", 10)]);

    let created = cache.create(counter("2", 5)).await.unwrap();
    assert_eq!(created, counter("2", 5));
    assert_eq!(
        values(&cache),
        vec![("1".to_string(), 10), ("2".to_string(), 5)]
    );

    cache.remove("1").await.unwrap();
    assert_eq!(values(&cache), vec![("2".to_string(), 5)]);

    // A fresh cache over the same store sees exactly what was confirmed.
    let reloaded = counters(store, MissingEntityPolicy::Ignore);
    reloaded.mount().await.unwrap();
    assert_eq!(reloaded.items().as_slice(), &[counter("2", 5)]);
}

#[tokio::test]
async fn concurrent_refreshes_share_one_load() {
    let store = sqlite_store().await;
    let cache = counters(store.clone(), MissingEntityPolicy::Ignore);

    let (a, b) = tokio::join!(cache.refresh(), cache.refresh());
    a.unwrap();
    b.unwrap();

    assert_eq!(store.loads.load(Ordering::SeqCst), 1);
    assert!(cache.async_state().is_ready());

    cache.mount().await.unwrap();
    assert_eq!(store.loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn update_of_uncached_id_still_reaches_store() {
    let store = sqlite_store().await;
    let cache = counters(store.clone(), MissingEntityPolicy::Ignore);
    cache.mount().await.unwrap();

    // Written behind the cache's back.
    store
        .insert("counters", record(json!({ "id": "ghost", "value": 1 })))
        .await
        .unwrap();

    let updated = cache
        .update("ghost", CounterPatch { value: Some(7) })
        .await
        .unwrap();
    assert_eq!(updated, counter("ghost", 7));
    assert!(cache.is_empty());

    let stored = store.load_all("counters").await.unwrap();
    assert_eq!(stored[0]["value"], 7);
}

#[tokio::test]
async fn refresh_policy_reloads_after_divergence() {
    let store = sqlite_store().await;
    let cache = counters(store.clone(), MissingEntityPolicy::Refresh);
    cache.mount().await.unwrap();

    store
        .insert("counters", record(json!({ "id": "ghost", "value": 1 })))
        .await
        .unwrap();

    cache
        .update("ghost", CounterPatch { value: Some(3) })
        .await
        .unwrap();
    assert_eq!(cache.items().as_slice(), &[counter("ghost", 3)]);
}

#[tokio::test]
async fn update_of_unknown_id_fails_without_touching_items() {
    let store = sqlite_store().await;
    let cache = counters(store, MissingEntityPolicy::Ignore);
    cache.mount().await.unwrap();
    cache.create(counter("1", 1)).await.unwrap();

    let err = cache
        .update("nope", CounterPatch { value: Some(2) })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CacheError::MutationFailed {
            operation: "update",
            ..
        }
    ));
    assert_eq!(cache.items().as_slice(), &[counter("1", 1)]);

    let err = cache.create(counter("1", 9)).await.unwrap_err();
    assert!(err.is_backend_failure());
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn subscribers_see_confirmed_changes() {
    let store = sqlite_store().await;
    let cache = counters(store, MissingEntityPolicy::Ignore);
    let mut rx = cache.subscribe();

    cache.mount().await.unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().state.is_ready());

    cache.create(counter("a", 1)).await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().items.len(), 1);
}

#[tokio::test]
async fn interleaved_instances_end_in_their_own_sequential_state() {
    let store = sqlite_store().await;
    let cache = counters(store.clone(), MissingEntityPolicy::Ignore);
    let customers = CustomersContext::new(store.clone(), ResourceSettings::default());
    cache.mount().await.unwrap();
    customers.mount().await.unwrap();

    let (counter_run, customer_run) = tokio::join!(
        async {
            cache.create(counter("a", 1)).await?;
            cache.create(counter("b", 2)).await?;
            cache.update("a", CounterPatch { value: Some(5) }).await?;
            cache.remove("b").await?;
            cache.create(counter("c", 3)).await?;
            Ok::<_, CacheError>(())
        },
        async {
            let ada = customers.create(Customer::new("Ada")).await?;
            let grace = customers.create(Customer::new("Grace")).await?;
            let patch = CustomerPatch {
                name: Some("Ada King".to_string()),
                ..Default::default()
            };
            customers.update(&ada.id, patch).await?;
            customers.remove(&grace.id).await?;
            Ok::<_, CacheError>(ada.id)
        }
    );
    counter_run.unwrap();
    let ada_id = customer_run.unwrap();

    let expected = vec![("a".to_string(), 5), ("c".to_string(), 3)];
    assert_eq!(values(&cache), expected);
    assert_eq!(customers.len(), 1);
    assert_eq!(customers.get(&ada_id).unwrap().name, "Ada King");

    // The store agrees with both caches after a reload
    cache.refresh().await.unwrap();
    customers.refresh().await.unwrap();
    let mut reloaded = values(&cache);
    reloaded.sort();
    assert_eq!(reloaded, expected);
    assert_eq!(customers.len(), 1);
    assert_eq!(customers.get(&ada_id).unwrap().name, "Ada King");
}

// =============================================================================
// AppContext over SQLite
// =============================================================================

#[tokio::test]
async fn app_context_round_trips_through_sqlite() {
    let config = AppConfig::in_memory();
    let app = AppContext::open(&config).await.unwrap();
    app.start().await;

    assert!(app.products.async_state().is_ready());
    assert_eq!(app.customers.async_state(), AsyncState::Idle);

    app.customers.mount().await.unwrap();
    let ada = app.customers.create(Customer::new("Ada")).await.unwrap();
    app.customers.adjust_points(&ada.id, 150).await.unwrap();
    app.customers.redeem_points(&ada.id, 50).await.unwrap();

    assert_eq!(app.customers.get(&ada.id).unwrap().loyalty_points, 100);

    let stored = app.store().load_all("customers").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["loyaltyPoints"], 100);

    app.refresh_all().await.unwrap();
    assert_eq!(app.customers.get(&ada.id).unwrap().loyalty_points, 100);
}
