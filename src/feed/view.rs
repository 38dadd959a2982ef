//! Shared ordered message view
//!
//! The one place the active message list lives. Only three mutations
//! exist: the synchronizer applies snapshots, pagination appends older
//! history, the expiry scheduler removes by identifier set. Removals are
//! set-difference against the current list, never positional, so a
//! removal decided from a stale snapshot cannot resurrect anything.

use crate::entities::Message;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Messages of one conversation, newest first.
#[derive(Default)]
pub struct SharedView {
    messages: RwLock<Vec<Message>>,
}

/// Handle shared between the synchronizer, scheduler and cursor.
pub type View = Arc<SharedView>;

impl SharedView {
    pub fn new() -> View {
        Arc::new(SharedView::default())
    }

    /// Current ordered copy of the view.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.read().expect("view lock poisoned").clone()
    }

    pub fn oldest(&self) -> Option<Message> {
        self.messages
            .read()
            .expect("view lock poisoned")
            .last()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.read().expect("view lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the live window with a fresh ordered snapshot, keeping
    /// any previously paginated history older than the snapshot's
    /// oldest entry. Ids present in the snapshot win over retained ones.
    pub fn apply_snapshot(&self, ordered: Vec<Message>) {
        let mut guard = self.messages.write().expect("view lock poisoned");

        let oldest_new = ordered.last().map(|m| m.timestamp);
        let ids: HashSet<&str> = ordered.iter().map(|m| m.message_id.as_str()).collect();
        let tail: Vec<Message> = match oldest_new {
            Some(cutoff) => guard
                .iter()
                .filter(|m| m.timestamp < cutoff && !ids.contains(m.message_id.as_str()))
                .cloned()
                .collect(),
            // An empty snapshot means the collection is empty.
            None => Vec::new(),
        };

        *guard = ordered;
        guard.extend(tail);
    }

    /// Append a page of older messages, skipping ids already present.
    pub fn append_older(&self, batch: &[Message]) {
        let mut guard = self.messages.write().expect("view lock poisoned");
        let ids: HashSet<&str> = guard.iter().map(|m| m.message_id.as_str()).collect();
        let fresh: Vec<Message> = batch
            .iter()
            .filter(|m| !ids.contains(m.message_id.as_str()))
            .cloned()
            .collect();
        guard.extend(fresh);
    }

    /// Remove the given ids; returns how many were actually present.
    pub fn remove_ids(&self, ids: &HashSet<String>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let mut guard = self.messages.write().expect("view lock poisoned");
        let before = guard.len();
        guard.retain(|m| !ids.contains(&m.message_id));
        before - guard.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MessageKind;
    use chrono::{TimeZone, Utc};

    fn msg(id: &str, ts_ms: i64) -> Message {
        Message {
            message_id: id.to_string(),
            text: format!("msg {id}"),
            sender_id: "a".to_string(),
            sender_name: "A".to_string(),
            timestamp: Utc.timestamp_millis_opt(ts_ms).unwrap(),
            read_by: vec![],
            auto_delete_at: None,
            kind: MessageKind::Text,
        }
    }

    #[test]
    fn snapshot_keeps_paginated_tail() {
        let view = SharedView::new();
        view.apply_snapshot(vec![msg("c", 30), msg("b", 20)]);
        view.append_older(&[msg("a", 10)]);

        // new snapshot only covers the live window
        view.apply_snapshot(vec![msg("d", 40), msg("c", 30), msg("b", 20)]);

        let ids: Vec<String> = view.snapshot().iter().map(|m| m.message_id.clone()).collect();
        assert_eq!(ids, vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn empty_snapshot_clears_everything() {
        let view = SharedView::new();
        view.apply_snapshot(vec![msg("a", 10)]);
        view.apply_snapshot(Vec::new());
        assert!(view.is_empty());
    }

    #[test]
    fn removals_are_set_difference() {
        let view = SharedView::new();
        view.apply_snapshot(vec![msg("c", 30), msg("b", 20), msg("a", 10)]);

        let mut ids = HashSet::new();
        ids.insert("b".to_string());
        ids.insert("ghost".to_string());
        assert_eq!(view.remove_ids(&ids), 1);
        assert_eq!(view.len(), 2);

        // removing again changes nothing
        assert_eq!(view.remove_ids(&ids), 0);
    }

    #[test]
    fn append_older_skips_known_ids() {
        let view = SharedView::new();
        view.apply_snapshot(vec![msg("b", 20)]);
        view.append_older(&[msg("b", 20), msg("a", 10)]);
        assert_eq!(view.len(), 2);
    }
}
