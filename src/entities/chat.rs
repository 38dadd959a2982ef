//! Chat entity (direct, two participants)

use crate::store::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized preview of the newest message, kept on the chat document
/// for list rendering. Client-written, so it may lag behind the message
/// sub-collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LastMessage {
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Chat {
    #[serde(skip)]
    pub chat_id: String,
    /// Always exactly two identities.
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<LastMessage>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn from_record(record: &Record) -> Result<Chat, serde_json::Error> {
        let mut chat: Chat =
            serde_json::from_value(serde_json::Value::Object(record.data.clone()))?;
        chat.chat_id = record.id.clone();
        Ok(chat)
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }
}
