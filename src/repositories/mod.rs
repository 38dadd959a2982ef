//! Repositories - typed access to the document store, one per entity

pub mod chat;
pub mod group;
pub mod message;
pub mod traits;
pub mod user;

pub use chat::ChatRepository;
pub use group::GroupRepository;
pub use message::MessageRepository;
pub use traits::{Create, Delete, Read};
pub use user::UserRepository;

/// Top-level collection names. Messages live in a `messages`
/// sub-collection under each chat or group document.
pub const CHATS: &str = "chats";
pub const GROUPS: &str = "groups";
pub const USERS: &str = "users";
