//! Group entity (N participants)

use crate::store::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Group {
    #[serde(skip)]
    pub group_id: String,
    pub name: String,
    /// At least the creator; grows via join.
    pub members: Vec<String>,
    /// The creator holds admin rights.
    pub created_by: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Group-wide default expiry applied to messages sent without one,
    /// in canonical milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_delete_duration_ms: Option<i64>,
}

impl Group {
    pub fn from_record(record: &Record) -> Result<Group, serde_json::Error> {
        let mut group: Group =
            serde_json::from_value(serde_json::Value::Object(record.data.clone()))?;
        group.group_id = record.id.clone();
        Ok(group)
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.created_by == user_id
    }
}
