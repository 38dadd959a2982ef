//! Chat DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for creating a direct chat.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateChatDTO {
    #[validate(length(min = 2, max = 2, message = "A direct chat has exactly two participants"))]
    pub participants: Vec<String>,
}

impl CreateChatDTO {
    pub fn between(a: &str, b: &str) -> Self {
        CreateChatDTO {
            participants: vec![a.to_string(), b.to_string()],
        }
    }
}
