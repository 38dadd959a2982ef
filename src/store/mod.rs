//! Document store collaborator
//!
//! The remote database is an external, managed service; this module only
//! defines the narrow surface the engine consumes (create / update /
//! delete / query / subscribe) plus an in-memory implementation used as
//! the test and reference backend. Transport, auth and consistency are
//! the collaborator's problem.

pub mod memory;
pub mod path;
pub mod query;

pub use memory::MemoryStore;
pub use path::{CollectionPath, DocumentPath};
pub use query::{Filter, Query, SortOrder, compare_values};

use serde_json::Value;
use std::fmt;
use std::future::Future;
use tokio::sync::mpsc::UnboundedReceiver;

/// Field map of a single document, without its key.
pub type Document = serde_json::Map<String, Value>;

/// A document together with the collection key it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub data: Document,
}

/// Sentinel replaced with the store's own clock when a write commits.
/// Creation timestamps are store-assigned, never taken from the sender.
pub fn server_timestamp() -> Value {
    Value::String(SERVER_TIMESTAMP_SENTINEL.to_string())
}

pub(crate) const SERVER_TIMESTAMP_SENTINEL: &str = "__server_timestamp__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed document or collection is gone.
    NotFound,
    /// The backend rejected or could not complete the call; retryable.
    Backend(String),
    /// The subscription or store handle was shut down.
    Closed,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "document not found"),
            StoreError::Backend(details) => write!(f, "store backend error: {}", details),
            StoreError::Closed => write!(f, "store connection closed"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Push event delivered to a live subscriber.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Current full set of records matching the subscribed filter.
    Snapshot(Vec<Record>),
    /// Subscription failure; delivered at most once, after which this
    /// subscription stays silent.
    Error(StoreError),
}

/// Live subscription to a collection.
///
/// Events arrive on `events`; dropping or unsubscribing the guard
/// permanently stops delivery.
pub struct Subscription {
    pub events: UnboundedReceiver<FeedEvent>,
    pub guard: SubscriptionGuard,
}

/// Unsubscribe capability. Calling [`SubscriptionGuard::unsubscribe`]
/// more than once is a no-op; dropping the guard unsubscribes too.
pub struct SubscriptionGuard {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionGuard {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        SubscriptionGuard {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// The store collaborator consumed by repositories and the feed layer.
///
/// All calls are async suspension points; no ordering is guaranteed
/// between two concurrently issued calls. The returned futures must be
/// `Send` so the feed and sweep tasks can run them off-task;
/// implementations just write `async fn`.
pub trait DocumentStore: Send + Sync + 'static {
    /// Create a document; the store assigns the key and resolves
    /// [`server_timestamp`] sentinels against its own clock.
    fn create(
        &self,
        collection: &CollectionPath,
        data: Document,
    ) -> impl Future<Output = Result<Record, StoreError>> + Send;

    /// Read a single document by path.
    fn get(
        &self,
        path: &DocumentPath,
    ) -> impl Future<Output = Result<Option<Record>, StoreError>> + Send;

    /// Shallow-merge `patch` into an existing document.
    fn update(
        &self,
        path: &DocumentPath,
        patch: Document,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a document. Deleting an already-absent document succeeds.
    fn delete(&self, path: &DocumentPath) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// One-shot query over a collection.
    fn query(
        &self,
        collection: &CollectionPath,
        query: Query,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send;

    /// Open a live subscription. The current matching snapshot is
    /// delivered immediately, then again on every change.
    fn subscribe(&self, collection: &CollectionPath, filter: Filter) -> Subscription;
}
