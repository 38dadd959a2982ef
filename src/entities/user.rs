//! User profile entity
//!
//! Authentication is the external provider's job; this record only
//! carries the display fields and the presence flag the engine updates.

use crate::store::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    #[serde(skip)]
    pub user_id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub online: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub last_seen: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn from_record(record: &Record) -> Result<UserProfile, serde_json::Error> {
        let mut user: UserProfile =
            serde_json::from_value(serde_json::Value::Object(record.data.clone()))?;
        user.user_id = record.id.clone();
        Ok(user)
    }
}
