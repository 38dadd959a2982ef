//! GroupRepository - group documents and membership writes

use super::{Create, Read};
use crate::dtos::CreateGroupDTO;
use crate::entities::Group;
use crate::store::{
    CollectionPath, DocumentStore, Filter, Query, StoreError, server_timestamp,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

pub struct GroupRepository<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> GroupRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn collection(&self) -> CollectionPath {
        CollectionPath::root(super::GROUPS)
    }

    /// All groups the user is a member of.
    pub async fn find_for_user(&self, user_id: &str) -> Result<Vec<Group>, StoreError> {
        let records = self
            .store
            .query(
                &self.collection(),
                Query::filtered(Filter::array_contains("members", user_id)),
            )
            .await?;
        Ok(records
            .iter()
            .filter_map(|record| match Group::from_record(record) {
                Ok(group) => Some(group),
                Err(e) => {
                    warn!(id = %record.id, "Skipping malformed group record: {e}");
                    None
                }
            })
            .collect())
    }

    /// Add an identity to the member set. Read-modify-write; adding an
    /// existing member is a no-op and reports `false`.
    pub async fn add_member(&self, group_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let group = self
            .read(&group_id.to_string())
            .await?
            .ok_or(StoreError::NotFound)?;
        if group.is_member(user_id) {
            return Ok(false);
        }

        let mut members = group.members;
        members.push(user_id.to_string());
        self.write_members(group_id, &members).await?;
        Ok(true)
    }

    /// Remove an identity from the member set; reports whether the set
    /// changed.
    pub async fn remove_member(&self, group_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let group = self
            .read(&group_id.to_string())
            .await?
            .ok_or(StoreError::NotFound)?;
        if !group.is_member(user_id) {
            return Ok(false);
        }

        let members: Vec<String> = group
            .members
            .into_iter()
            .filter(|m| m != user_id)
            .collect();
        self.write_members(group_id, &members).await?;
        Ok(true)
    }

    async fn write_members(&self, group_id: &str, members: &[String]) -> Result<(), StoreError> {
        let Value::Object(patch) = json!({ "members": members }) else {
            unreachable!()
        };
        self.store.update(&self.collection().doc(group_id), patch).await
    }
}

impl<S: DocumentStore> Create<Group, CreateGroupDTO> for GroupRepository<S> {
    async fn create(&self, data: &CreateGroupDTO) -> Result<Group, StoreError> {
        let mut doc = json!({
            "name": data.name,
            "members": [data.created_by],
            "created_by": data.created_by,
            "created_at": server_timestamp(),
        });
        if let Some(ms) = data.auto_delete.and_then(|preset| preset.duration_ms()) {
            doc["auto_delete_duration_ms"] = Value::from(ms);
        }
        let Value::Object(doc) = doc else {
            unreachable!()
        };

        let record = self.store.create(&self.collection(), doc).await?;
        Group::from_record(&record)
            .map_err(|e| StoreError::Backend(format!("malformed group record: {e}")))
    }
}

impl<S: DocumentStore> Read<Group, String> for GroupRepository<S> {
    async fn read(&self, id: &String) -> Result<Option<Group>, StoreError> {
        let record = self.store.get(&self.collection().doc(id)).await?;
        Ok(record.and_then(|r| Group::from_record(&r).ok()))
    }
}
