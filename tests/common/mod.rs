#![allow(dead_code)]

use fadelink::entities::Message;
use fadelink::store::{
    CollectionPath, Document, DocumentPath, DocumentStore, FeedEvent, Filter, MemoryStore, Query,
    Record, StoreError, Subscription, SubscriptionGuard,
};
use fadelink::{AppState, Config};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::watch;

/// AppState over a plain in-memory store with default configuration.
pub fn test_state() -> AppState<MemoryStore> {
    AppState::new(Arc::new(MemoryStore::new()), Config::default())
}

/// AppState over a fault-injecting store, plus a handle to drive it.
pub fn flaky_state() -> (Arc<FlakyStore>, AppState<FlakyStore>) {
    let store = Arc::new(FlakyStore::new());
    let state = AppState::new(store.clone(), Config::default());
    (store, state)
}

/// Write a message document directly into `{root}/{parent}/messages`,
/// bypassing the service layer. Returns the assigned id.
pub async fn seed_message<S: DocumentStore>(
    store: &S,
    root: &str,
    parent: &str,
    text: &str,
    ts_ms: i64,
    expires_ms: Option<i64>,
) -> String {
    let mut data = json!({
        "text": text,
        "sender_id": "alice",
        "sender_name": "Alice",
        "kind": "text",
        "read_by": [],
        "timestamp": ts_ms,
    });
    if let Some(at) = expires_ms {
        data["auto_delete_at"] = Value::from(at);
    }
    let Value::Object(data) = data else { unreachable!() };

    let collection = CollectionPath::root(root).doc(parent).collection("messages");
    store
        .create(&collection, data)
        .await
        .expect("seed message")
        .id
}

/// Await the ordered view until `pred` holds, or panic after 5 seconds.
pub async fn wait_until(
    rx: &mut watch::Receiver<Vec<Message>>,
    pred: impl Fn(&[Message]) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if pred(&rx.borrow_and_update()) {
                return;
            }
            rx.changed().await.expect("feed closed while waiting");
        }
    })
    .await
    .expect("condition not reached in time");
}

/// In-memory store with injectable faults: per-document delete
/// failures, whole-query failures, a query delay (to hold a fetch in
/// flight), a failing subscribe, and call counters.
pub struct FlakyStore {
    inner: MemoryStore,
    fail_delete_ids: Mutex<HashSet<String>>,
    fail_queries: AtomicBool,
    fail_subscribe: AtomicBool,
    query_delay_ms: AtomicU64,
    query_count: AtomicUsize,
    delete_count: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        FlakyStore {
            inner: MemoryStore::new(),
            fail_delete_ids: Mutex::new(HashSet::new()),
            fail_queries: AtomicBool::new(false),
            fail_subscribe: AtomicBool::new(false),
            query_delay_ms: AtomicU64::new(0),
            query_count: AtomicUsize::new(0),
            delete_count: AtomicUsize::new(0),
        }
    }

    pub fn fail_deletes_of(&self, id: &str) {
        self.fail_delete_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn heal_deletes_of(&self, id: &str) {
        self.fail_delete_ids.lock().unwrap().remove(id);
    }

    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    pub fn set_query_delay_ms(&self, ms: u64) {
        self.query_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn queries(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.delete_count.load(Ordering::SeqCst)
    }
}

impl DocumentStore for FlakyStore {
    async fn create(
        &self,
        collection: &CollectionPath,
        data: Document,
    ) -> Result<Record, StoreError> {
        self.inner.create(collection, data).await
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<Record>, StoreError> {
        self.inner.get(path).await
    }

    async fn update(&self, path: &DocumentPath, patch: Document) -> Result<(), StoreError> {
        self.inner.update(path, patch).await
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        self.delete_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete_ids.lock().unwrap().contains(path.id()) {
            return Err(StoreError::Backend("injected delete failure".to_string()));
        }
        self.inner.delete(path).await
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        query: Query,
    ) -> Result<Vec<Record>, StoreError> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected query failure".to_string()));
        }
        let delay = self.query_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.inner.query(collection, query).await
    }

    fn subscribe(&self, collection: &CollectionPath, filter: Filter) -> Subscription {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            let (tx, rx) = unbounded_channel();
            let _ = tx.send(FeedEvent::Error(StoreError::Backend(
                "injected subscribe failure".to_string(),
            )));
            return Subscription {
                events: rx,
                guard: SubscriptionGuard::new(|| {}),
            };
        }
        self.inner.subscribe(collection, filter)
    }
}
