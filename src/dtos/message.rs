//! Message DTOs

use crate::entities::MessageKind;
use crate::expiry::AutoDeletePreset;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MAX_MESSAGE_LENGTH: u64 = 1000;

/// Input for sending a message. Text is trimmed by the service before
/// validation, so whitespace-only input fails the length check and is
/// rejected with no remote call.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct SendMessageDTO {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Message text must be between 1 and 1000 characters"
    ))]
    pub text: String,

    #[validate(length(min = 1, message = "Sender identity is required"))]
    pub sender_id: String,

    pub sender_name: String,

    #[serde(default)]
    pub kind: MessageKind,

    /// Expiry preset; `None` and `Never` both mean the message keeps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_delete: Option<AutoDeletePreset>,
}

impl SendMessageDTO {
    pub fn text(sender_id: &str, sender_name: &str, text: &str) -> Self {
        SendMessageDTO {
            text: text.to_string(),
            sender_id: sender_id.to_string(),
            sender_name: sender_name.to_string(),
            kind: MessageKind::Text,
            auto_delete: None,
        }
    }

    pub fn with_auto_delete(mut self, preset: AutoDeletePreset) -> Self {
        self.auto_delete = Some(preset);
        self
    }
}
