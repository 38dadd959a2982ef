//! Message entity

use super::enums::MessageKind;
use crate::store::Record;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A message as materialized from the store.
///
/// All instants are absolute UTC; on the wire they are epoch
/// milliseconds, the one canonical unit every duration preset converts
/// through.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    #[serde(skip)]
    pub message_id: String,
    pub text: String,
    pub sender_id: String,
    pub sender_name: String,
    /// Store-assigned creation time; the authoritative ordering key.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read_by: Vec<String>,
    /// Absolute expiry; absent for messages that never expire.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub auto_delete_at: Option<DateTime<Utc>>,
    pub kind: MessageKind,
}

impl Message {
    /// Normalize a raw store record into a `Message`.
    ///
    /// The collection key becomes the identifier. A missing or
    /// unresolvable timestamp defaults to `observed_at` (the local clock
    /// at snapshot observation) instead of failing; every other field
    /// degrades to its empty form. Incoming snapshots are never rejected.
    pub fn from_record(record: &Record, observed_at: DateTime<Utc>) -> Message {
        let data = &record.data;

        let timestamp = data
            .get("timestamp")
            .and_then(|v| v.as_i64())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or(observed_at);

        let auto_delete_at = data
            .get("auto_delete_at")
            .and_then(|v| v.as_i64())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        let read_by = data
            .get("read_by")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let kind = data
            .get("kind")
            .and_then(|v| v.as_str())
            .and_then(MessageKind::parse)
            .unwrap_or(MessageKind::Text);

        let text_field = |field: &str| {
            data.get(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        Message {
            message_id: record.id.clone(),
            text: text_field("text"),
            sender_id: text_field("sender_id"),
            sender_name: text_field("sender_name"),
            timestamp,
            read_by,
            auto_delete_at,
            kind,
        }
    }

    /// Whether the message's expiry has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.auto_delete_at.is_some_and(|at| at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, data: serde_json::Value) -> Record {
        Record {
            id: id.to_string(),
            data: data.as_object().unwrap().clone(),
        }
    }

    #[test]
    fn missing_timestamp_defaults_to_observation_time() {
        let observed = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let msg = Message::from_record(&record("m1", json!({ "text": "hi" })), observed);
        assert_eq!(msg.timestamp, observed);
        assert_eq!(msg.message_id, "m1");
        assert_eq!(msg.kind, MessageKind::Text);
        assert!(msg.auto_delete_at.is_none());
    }

    #[test]
    fn full_record_round_trips() {
        let observed = Utc::now();
        let msg = Message::from_record(
            &record(
                "m2",
                json!({
                    "text": "bye",
                    "sender_id": "alice",
                    "sender_name": "Alice",
                    "timestamp": 1_700_000_000_000_i64,
                    "read_by": ["alice", "bob"],
                    "auto_delete_at": 1_700_000_060_000_i64,
                    "kind": "system"
                }),
            ),
            observed,
        );
        assert_eq!(msg.sender_id, "alice");
        assert_eq!(msg.read_by, vec!["alice", "bob"]);
        assert_eq!(msg.kind, MessageKind::System);
        assert_eq!(
            msg.auto_delete_at.unwrap().timestamp_millis(),
            1_700_000_060_000
        );
    }

    #[test]
    fn expiry_check_is_inclusive_of_the_deadline() {
        let at = Utc.timestamp_millis_opt(1_000).unwrap();
        let msg = Message {
            message_id: "m".into(),
            text: "x".into(),
            sender_id: "a".into(),
            sender_name: "A".into(),
            timestamp: Utc.timestamp_millis_opt(0).unwrap(),
            read_by: vec![],
            auto_delete_at: Some(at),
            kind: MessageKind::Text,
        };
        assert!(!msg.is_expired(Utc.timestamp_millis_opt(999).unwrap()));
        assert!(msg.is_expired(at));
        assert!(msg.is_expired(Utc.timestamp_millis_opt(1_001).unwrap()));
    }
}
