//! Group DTOs

use crate::expiry::AutoDeletePreset;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MAX_GROUP_NAME_LENGTH: u64 = 50;
pub const MAX_GROUP_MEMBERS: usize = 100;

lazy_static! {
    /// Letters, digits, spaces, underscores and dashes.
    static ref RE_GROUP_NAME: Regex = Regex::new(r"^[\w\- ]+$").unwrap();
}

/// Input for creating a group.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateGroupDTO {
    #[validate(
        length(min = 1, max = 50, message = "Group name must be between 1 and 50 characters"),
        regex(
            path = *RE_GROUP_NAME,
            message = "Group name may only contain letters, digits, spaces, underscores and dashes"
        )
    )]
    pub name: String,

    #[validate(length(min = 1, message = "Creator identity is required"))]
    pub created_by: String,

    /// Default expiry applied to messages sent in this group without an
    /// explicit preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_delete: Option<AutoDeletePreset>,
}
