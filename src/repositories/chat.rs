//! ChatRepository - direct chat documents

use super::{Create, Read};
use crate::dtos::CreateChatDTO;
use crate::entities::Chat;
use crate::store::{
    CollectionPath, DocumentStore, Filter, Query, StoreError, Subscription, server_timestamp,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

pub struct ChatRepository<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> ChatRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn collection(&self) -> CollectionPath {
        CollectionPath::root(super::CHATS)
    }

    /// All chats the user participates in.
    pub async fn find_for_user(&self, user_id: &str) -> Result<Vec<Chat>, StoreError> {
        let records = self
            .store
            .query(
                &self.collection(),
                Query::filtered(Filter::array_contains("participants", user_id)),
            )
            .await?;
        Ok(decode_chats(&records))
    }

    /// The direct chat between two users, if one exists.
    ///
    /// The store can only filter on one array-contains clause, so the
    /// second participant is matched client-side.
    pub async fn find_between(&self, user_a: &str, user_b: &str) -> Result<Option<Chat>, StoreError> {
        let chats = self.find_for_user(user_a).await?;
        Ok(chats.into_iter().find(|chat| chat.has_participant(user_b)))
    }

    /// Rewrite the denormalized preview after a send. The preview
    /// timestamp is store-assigned like the message's own.
    pub async fn set_last_message(&self, chat_id: &str, text: &str) -> Result<(), StoreError> {
        let Value::Object(patch) = json!({
            "last_message": { "text": text, "timestamp": server_timestamp() },
        }) else {
            unreachable!()
        };
        self.store.update(&self.collection().doc(chat_id), patch).await
    }

    /// Live subscription to the user's chat list.
    pub fn subscribe_for_user(&self, user_id: &str) -> Subscription {
        self.store.subscribe(
            &self.collection(),
            Filter::array_contains("participants", user_id),
        )
    }
}

impl<S: DocumentStore> Create<Chat, CreateChatDTO> for ChatRepository<S> {
    async fn create(&self, data: &CreateChatDTO) -> Result<Chat, StoreError> {
        let Value::Object(doc) = json!({
            "participants": data.participants,
            "created_at": server_timestamp(),
        }) else {
            unreachable!()
        };

        let record = self.store.create(&self.collection(), doc).await?;
        Chat::from_record(&record)
            .map_err(|e| StoreError::Backend(format!("malformed chat record: {e}")))
    }
}

impl<S: DocumentStore> Read<Chat, String> for ChatRepository<S> {
    async fn read(&self, id: &String) -> Result<Option<Chat>, StoreError> {
        let record = self.store.get(&self.collection().doc(id)).await?;
        Ok(record.and_then(|r| Chat::from_record(&r).ok()))
    }
}

/// Decode records, skipping (and logging) any that do not parse as chats.
pub(crate) fn decode_chats(records: &[crate::store::Record]) -> Vec<Chat> {
    records
        .iter()
        .filter_map(|record| match Chat::from_record(record) {
            Ok(chat) => Some(chat),
            Err(e) => {
                warn!(id = %record.id, "Skipping malformed chat record: {e}");
                None
            }
        })
        .collect()
}
