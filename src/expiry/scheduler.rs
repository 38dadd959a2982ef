//! Expiry Scheduler
//!
//! Collects messages whose expiry has passed and deletes them: remote
//! first, concurrently, then locally for the ids the store confirmed.
//! A failed remote delete leaves the message visible and pending, to be
//! retried on the next sweep; the view is never left claiming a
//! deletion the store has not acknowledged.

use crate::feed::view::View;
use crate::repositories::{Delete, MessageRepository};
use crate::store::DocumentStore;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

pub struct ExpiryScheduler<S: DocumentStore> {
    repo: MessageRepository<S>,
    parent_id: String,
    view: View,
    /// Ids awaiting a confirmed remote delete.
    pending: Mutex<HashSet<String>>,
}

impl<S: DocumentStore> ExpiryScheduler<S> {
    pub fn new(repo: MessageRepository<S>, parent_id: &str, view: View) -> Self {
        Self {
            repo,
            parent_id: parent_id.to_string(),
            view,
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Scan the loaded view and stage every expired message for
    /// deletion. Returns how many ids were newly staged. Tolerates an
    /// empty view and re-staging ids already pending.
    pub fn collect_expired(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .view
            .snapshot()
            .iter()
            .filter(|m| m.is_expired(now))
            .map(|m| m.message_id.clone())
            .collect();

        if expired.is_empty() {
            return 0;
        }

        let mut pending = self.pending.lock().expect("pending lock poisoned");
        let before = pending.len();
        pending.extend(expired);
        let staged = pending.len() - before;
        if staged > 0 {
            debug!(staged, "Expired messages staged for deletion");
        }
        staged
    }

    /// Issue one remote delete per pending id, all concurrently, and
    /// wait for every one to settle. Only confirmed ids leave the local
    /// view and the pending set; failures stay for the next sweep.
    pub async fn flush_pending(&self) -> usize {
        let batch: Vec<String> = {
            let pending = self.pending.lock().expect("pending lock poisoned");
            pending.iter().cloned().collect()
        };
        if batch.is_empty() {
            return 0;
        }

        let deletes = batch.iter().map(|id| {
            let key = (self.parent_id.clone(), id.clone());
            async move { self.repo.delete(&key).await }
        });
        let results = join_all(deletes).await;

        let mut confirmed: HashSet<String> = HashSet::new();
        let mut failed = 0usize;
        for (id, result) in batch.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    confirmed.insert(id);
                }
                Err(e) => {
                    failed += 1;
                    warn!(message_id = %id, "Remote delete failed, will retry: {e}");
                }
            }
        }

        let removed = self.view.remove_ids(&confirmed);
        {
            let mut pending = self.pending.lock().expect("pending lock poisoned");
            for id in &confirmed {
                pending.remove(id);
            }
        }

        if !confirmed.is_empty() {
            info!(
                deleted = confirmed.len(),
                removed_locally = removed,
                failed,
                "Expiry deletions settled"
            );
        }
        confirmed.len()
    }

    /// One full sweep: stage expired messages, then execute the pending
    /// deletions. Returns how many messages were confirmed deleted.
    #[instrument(skip(self, now), fields(conversation = %self.parent_id))]
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> usize {
        self.collect_expired(now);
        self.flush_pending().await
    }

    /// Ids currently awaiting a confirmed remote delete.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().expect("pending lock poisoned").len()
    }
}
