//! In-memory document store
//!
//! Reference backend used by the test suite and local development. Keeps
//! one concurrent map per collection and a registry of live subscribers;
//! every committed write re-pushes the full matching snapshot to each
//! subscriber of that collection, which is the delivery model the feed
//! layer is written against.

use super::query::{Filter, Query, SortOrder, compare_values};
use super::{
    CollectionPath, Document, DocumentPath, FeedEvent, Record, SERVER_TIMESTAMP_SENTINEL,
    StoreError, Subscription, SubscriptionGuard,
};
use crate::store::DocumentStore;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tracing::{debug, warn};

struct Subscriber {
    collection: String,
    filter: Filter,
    tx: UnboundedSender<FeedEvent>,
}

pub struct MemoryStore {
    collections: DashMap<String, DashMap<String, Document>>,
    subscribers: Arc<DashMap<u64, Subscriber>>,
    next_doc: AtomicU64,
    next_sub: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            collections: DashMap::new(),
            subscribers: Arc::new(DashMap::new()),
            next_doc: AtomicU64::new(1),
            next_sub: AtomicU64::new(1),
        }
    }

    /// Zero-padded so that key order equals insertion order.
    fn next_doc_id(&self) -> String {
        format!("d{:08}", self.next_doc.fetch_add(1, Ordering::Relaxed))
    }

    /// Current records of a collection, key-ordered for determinism.
    fn snapshot(&self, collection: &str, filter: &Filter) -> Vec<Record> {
        let mut records: Vec<Record> = match self.collections.get(collection) {
            Some(docs) => docs
                .iter()
                .filter(|entry| filter.matches(entry.value()))
                .map(|entry| Record {
                    id: entry.key().clone(),
                    data: entry.value().clone(),
                })
                .collect(),
            None => Vec::new(),
        };
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    /// Push the current snapshot to every live subscriber of `collection`.
    /// Subscribers whose receiver is gone are dropped from the registry.
    fn notify(&self, collection: &str) {
        self.subscribers.retain(|_, sub| {
            if sub.collection != collection {
                return true;
            }
            let snapshot = self.snapshot(collection, &sub.filter);
            debug!(
                collection,
                records = snapshot.len(),
                "Pushing snapshot to subscriber"
            );
            sub.tx.send(FeedEvent::Snapshot(snapshot)).is_ok()
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace [`server_timestamp`](super::server_timestamp) sentinels with
/// the given commit time, recursively.
fn resolve_server_timestamps(value: &mut Value, commit_ms: i64) {
    match value {
        Value::String(s) if s == SERVER_TIMESTAMP_SENTINEL => {
            *value = Value::from(commit_ms);
        }
        Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                resolve_server_timestamps(v, commit_ms);
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                resolve_server_timestamps(v, commit_ms);
            }
        }
        _ => {}
    }
}

impl DocumentStore for MemoryStore {
    async fn create(
        &self,
        collection: &CollectionPath,
        data: Document,
    ) -> Result<Record, StoreError> {
        let mut data = data;
        let mut wrapped = Value::Object(std::mem::take(&mut data));
        resolve_server_timestamps(&mut wrapped, Utc::now().timestamp_millis());
        let Value::Object(data) = wrapped else {
            unreachable!()
        };

        let id = self.next_doc_id();
        self.collections
            .entry(collection.as_str().to_string())
            .or_default()
            .insert(id.clone(), data.clone());

        self.notify(collection.as_str());
        Ok(Record { id, data })
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<Record>, StoreError> {
        Ok(self
            .collections
            .get(path.parent().as_str())
            .and_then(|docs| docs.get(path.id()).map(|doc| Record {
                id: path.id().to_string(),
                data: doc.value().clone(),
            })))
    }

    async fn update(&self, path: &DocumentPath, patch: Document) -> Result<(), StoreError> {
        let mut patch = patch;
        let mut wrapped = Value::Object(std::mem::take(&mut patch));
        resolve_server_timestamps(&mut wrapped, Utc::now().timestamp_millis());
        let Value::Object(patch) = wrapped else {
            unreachable!()
        };

        let collection = self
            .collections
            .get(path.parent().as_str())
            .ok_or(StoreError::NotFound)?;
        {
            let mut doc = collection.get_mut(path.id()).ok_or(StoreError::NotFound)?;
            for (field, value) in patch {
                doc.insert(field, value);
            }
        }
        drop(collection);

        self.notify(path.parent().as_str());
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        let removed = self
            .collections
            .get(path.parent().as_str())
            .and_then(|docs| docs.remove(path.id()));

        // Deleting an absent document is a success; only notify when
        // something actually changed.
        if removed.is_some() {
            self.notify(path.parent().as_str());
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        query: Query,
    ) -> Result<Vec<Record>, StoreError> {
        let mut records = self.snapshot(collection.as_str(), &query.filter);

        if let Some((field, order)) = &query.order_by {
            records.sort_by(|a, b| {
                let va = a.data.get(field).unwrap_or(&Value::Null);
                let vb = b.data.get(field).unwrap_or(&Value::Null);
                match order {
                    SortOrder::Ascending => compare_values(va, vb),
                    SortOrder::Descending => compare_values(vb, va),
                }
            });

            if let Some(cursor) = &query.start_after {
                records.retain(|record| {
                    let v = record.data.get(field).unwrap_or(&Value::Null);
                    match order {
                        SortOrder::Ascending => {
                            compare_values(v, cursor) == std::cmp::Ordering::Greater
                        }
                        SortOrder::Descending => {
                            compare_values(v, cursor) == std::cmp::Ordering::Less
                        }
                    }
                });
            }
        } else if query.start_after.is_some() {
            warn!("start_after without order_by is ignored");
        }

        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    fn subscribe(&self, collection: &CollectionPath, filter: Filter) -> Subscription {
        let (tx, rx) = unbounded_channel();

        // Initial snapshot is delivered before any change can race it.
        let initial = self.snapshot(collection.as_str(), &filter);
        let _ = tx.send(FeedEvent::Snapshot(initial));

        let sub_id = self.next_sub.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(
            sub_id,
            Subscriber {
                collection: collection.as_str().to_string(),
                filter,
                tx,
            },
        );
        debug!(collection = collection.as_str(), sub_id, "Subscriber registered");

        let registry = Arc::clone(&self.subscribers);
        let guard = SubscriptionGuard::new(move || {
            registry.remove(&sub_id);
        });

        Subscription { events: rx, guard }
    }
}
