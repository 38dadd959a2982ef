//! UserRepository - profile reads and the presence flag

use super::Read;
use crate::entities::UserProfile;
use crate::store::{CollectionPath, DocumentStore, StoreError, server_timestamp};
use serde_json::{Value, json};
use std::sync::Arc;

pub struct UserRepository<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> UserRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn collection(&self) -> CollectionPath {
        CollectionPath::root(super::USERS)
    }

    /// Flip the boolean presence flag and stamp `last_seen`.
    pub async fn set_presence(&self, user_id: &str, online: bool) -> Result<(), StoreError> {
        let Value::Object(patch) = json!({
            "online": online,
            "last_seen": server_timestamp(),
        }) else {
            unreachable!()
        };
        self.store.update(&self.collection().doc(user_id), patch).await
    }
}

impl<S: DocumentStore> Read<UserProfile, String> for UserRepository<S> {
    async fn read(&self, id: &String) -> Result<Option<UserProfile>, StoreError> {
        let record = self.store.get(&self.collection().doc(id)).await?;
        Ok(record.and_then(|r| UserProfile::from_record(&r).ok()))
    }
}
