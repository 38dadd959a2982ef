//! Enumerations shared by the entities

use serde::{Deserialize, Serialize};

/// Kind of a message. System messages are synthetic membership notices
/// and carry no human sender.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    System,
    Image,
}

impl MessageKind {
    /// Wire name as stored in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::System => "system",
            MessageKind::Image => "image",
        }
    }

    /// Lenient parse; unknown values fall back to `Text`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(MessageKind::Text),
            "system" => Some(MessageKind::System),
            "image" => Some(MessageKind::Image),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Member,
}
