//! Application State
//!
//! Aggregates the repositories and configuration shared by the service
//! layer and the per-conversation sessions.

use crate::core::config::Config;
use crate::repositories::{
    CHATS, ChatRepository, GROUPS, GroupRepository, MessageRepository, UserRepository,
};
use crate::store::DocumentStore;
use std::sync::Arc;

pub struct AppState<S: DocumentStore> {
    /// Store collaborator handle, shared by every repository.
    pub store: Arc<S>,

    /// Repository for direct chat documents
    pub chat: ChatRepository<S>,

    /// Repository for group documents
    pub group: GroupRepository<S>,

    /// Repository for messages under `chats/{id}/messages`
    pub chat_messages: MessageRepository<S>,

    /// Repository for messages under `groups/{id}/messages`
    pub group_messages: MessageRepository<S>,

    /// Repository for user profiles and presence
    pub user: UserRepository<S>,

    /// Runtime knobs (page size, timer intervals)
    pub config: Config,
}

impl<S: DocumentStore> AppState<S> {
    /// Build the state from a store handle and configuration, wiring
    /// every repository to the same store.
    pub fn new(store: Arc<S>, config: Config) -> Self {
        Self {
            chat: ChatRepository::new(store.clone()),
            group: GroupRepository::new(store.clone()),
            chat_messages: MessageRepository::new(store.clone(), CHATS),
            group_messages: MessageRepository::new(store.clone(), GROUPS),
            user: UserRepository::new(store.clone()),
            store,
            config,
        }
    }
}
