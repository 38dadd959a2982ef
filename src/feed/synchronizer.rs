//! Message Feed Synchronizer
//!
//! Turns the raw snapshot stream of one conversation into the ordered,
//! de-duplicated view the rest of the engine works against. The sort
//! here is the only ordering guarantee the engine gives: snapshot
//! delivery is not monotonic with respect to send order under retries.

use super::view::View;
use crate::entities::Message;
use crate::repositories::MessageRepository;
use crate::store::{DocumentStore, FeedEvent, Record, StoreError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{debug, info, warn};

/// First resubscribe delay after a subscription error.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
/// Backoff ceiling for repeated subscription errors.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Normalize one snapshot: materialize identifiers, default missing
/// timestamps to `observed_at`, drop duplicate ids (last writer wins),
/// sort newest first. The sort is stable, so records with equal
/// timestamps keep their within-snapshot order.
pub fn normalize_snapshot(records: &[Record], observed_at: DateTime<Utc>) -> Vec<Message> {
    let mut index_of: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut messages: Vec<Message> = Vec::with_capacity(records.len());

    for record in records {
        let message = Message::from_record(record, observed_at);
        match index_of.get(&message.message_id) {
            Some(&i) => messages[i] = message,
            None => {
                index_of.insert(message.message_id.clone(), messages.len());
                messages.push(message);
            }
        }
    }

    messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    messages
}

/// Feed task of one conversation.
///
/// Owns the live subscription: applies every incoming snapshot to the
/// shared view, republishes the ordered result on the watch channel and
/// nudges the expiry scheduler. A subscription error is reported on the
/// error channel, then the task resubscribes with capped exponential
/// backoff instead of dying; the backoff resets once snapshots flow
/// again. Shutdown ends the task on every path.
pub(crate) async fn run_feed<S: DocumentStore>(
    repo: MessageRepository<S>,
    parent_id: String,
    view: View,
    updates: watch::Sender<Vec<Message>>,
    errors: UnboundedSender<StoreError>,
    nudges: UnboundedSender<()>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Feed task started");
    let mut backoff = INITIAL_BACKOFF;

    'session: loop {
        let mut subscription = repo.subscribe(&parent_id);

        loop {
            tokio::select! {
                event = subscription.events.recv() => match event {
                    Some(FeedEvent::Snapshot(records)) => {
                        backoff = INITIAL_BACKOFF;
                        let ordered = normalize_snapshot(&records, Utc::now());
                        debug!(messages = ordered.len(), "Applying snapshot");
                        view.apply_snapshot(ordered);
                        let _ = updates.send(view.snapshot());
                        let _ = nudges.send(());
                    }
                    Some(FeedEvent::Error(e)) => {
                        warn!("Subscription error: {e}");
                        let _ = errors.send(e);
                        break;
                    }
                    None => {
                        info!("Subscription closed by the store");
                        break 'session;
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break 'session;
                    }
                }
            }
        }

        // the failed subscription is dropped (and thereby cancelled)
        // before the replacement is opened
        warn!(delay_ms = backoff.as_millis() as u64, "Resubscribing after error");
        tokio::select! {
            _ = tokio::time::sleep(backoff) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break 'session;
                }
            }
        }
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }

    info!("Feed task terminated");
}
