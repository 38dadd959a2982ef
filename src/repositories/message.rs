//! MessageRepository - message sub-collections under chats or groups

use super::{Delete, Read};
use crate::dtos::SendMessageDTO;
use crate::entities::Message;
use crate::store::{
    CollectionPath, DocumentStore, Filter, Query, SortOrder, StoreError, Subscription,
    server_timestamp,
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::sync::Arc;

/// Messages of one conversation kind. The same repository type serves
/// both `chats/{id}/messages` and `groups/{id}/messages`; the root
/// collection name is fixed at construction.
pub struct MessageRepository<S> {
    store: Arc<S>,
    root: &'static str,
}

impl<S> Clone for MessageRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            root: self.root,
        }
    }
}

impl<S: DocumentStore> MessageRepository<S> {
    pub fn new(store: Arc<S>, root: &'static str) -> Self {
        Self { store, root }
    }

    /// Path of the message sub-collection of one conversation.
    pub fn collection(&self, parent_id: &str) -> CollectionPath {
        CollectionPath::root(self.root)
            .doc(parent_id)
            .collection("messages")
    }

    /// Persist a new message. The creation timestamp is assigned by the
    /// store; the expiry instant, when given, was computed by the caller
    /// from the canonical preset table.
    pub async fn create(
        &self,
        parent_id: &str,
        dto: &SendMessageDTO,
        auto_delete_at: Option<DateTime<Utc>>,
    ) -> Result<Message, StoreError> {
        let mut data = json!({
            "text": dto.text,
            "sender_id": dto.sender_id,
            "sender_name": dto.sender_name,
            "kind": dto.kind,
            "read_by": [dto.sender_id],
            "timestamp": server_timestamp(),
        });
        if let Some(at) = auto_delete_at {
            data["auto_delete_at"] = Value::from(at.timestamp_millis());
        }
        let Value::Object(data) = data else {
            unreachable!()
        };

        let record = self.store.create(&self.collection(parent_id), data).await?;
        Ok(Message::from_record(&record, Utc::now()))
    }

    /// Fetch one page of messages, newest first.
    ///
    /// With `before` set, only messages strictly older than that instant
    /// are returned; this is the backward-walking pagination cursor.
    pub async fn find_page(
        &self,
        parent_id: &str,
        before: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        let mut query = Query::all()
            .order_by("timestamp", SortOrder::Descending)
            .limit(limit);
        if let Some(before) = before {
            query = query.start_after(before.timestamp_millis());
        }

        let records = self.store.query(&self.collection(parent_id), query).await?;
        let observed_at = Utc::now();
        Ok(records
            .iter()
            .map(|record| Message::from_record(record, observed_at))
            .collect())
    }

    /// Live subscription to the full message collection of one
    /// conversation.
    pub fn subscribe(&self, parent_id: &str) -> Subscription {
        self.store.subscribe(&self.collection(parent_id), Filter::All)
    }

    /// Add an identity to a message's read set. Read-modify-write; the
    /// set union keeps the operation idempotent.
    pub async fn mark_read(
        &self,
        parent_id: &str,
        message_id: &str,
        reader_id: &str,
    ) -> Result<(), StoreError> {
        let path = self.collection(parent_id).doc(message_id);
        let record = self.store.get(&path).await?.ok_or(StoreError::NotFound)?;

        let mut read_by: Vec<String> = record
            .data
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
        if read_by.iter().any(|r| r == reader_id) {
            return Ok(());
        }
        read_by.push(reader_id.to_string());

        let Value::Object(patch) = json!({ "read_by": read_by }) else {
            unreachable!()
        };
        self.store.update(&path, patch).await
    }
}

impl<S: DocumentStore> Read<Message, (String, String)> for MessageRepository<S> {
    async fn read(&self, id: &(String, String)) -> Result<Option<Message>, StoreError> {
        let (parent_id, message_id) = id;
        let record = self
            .store
            .get(&self.collection(parent_id).doc(message_id))
            .await?;
        Ok(record.map(|r| Message::from_record(&r, Utc::now())))
    }
}

impl<S: DocumentStore> Delete<(String, String)> for MessageRepository<S> {
    async fn delete(&self, id: &(String, String)) -> Result<(), StoreError> {
        let (parent_id, message_id) = id;
        self.store
            .delete(&self.collection(parent_id).doc(message_id))
            .await
    }
}
