//! Services - the operation surface exposed to the view layer
//!
//! Every operation validates before its first remote call, propagates
//! failures explicitly and logs a diagnostic on each error path.

pub mod chat;
pub mod group;
pub mod user;

pub use chat::{
    chats_from_snapshot, create_chat, delete_chat_message, find_existing_chat,
    mark_chat_message_read, send_chat_message, subscribe_user_chats, user_chats,
};
pub use group::{
    create_group, group_details, join_group, leave_group, remove_member, send_group_message,
    user_groups,
};
pub use user::{profile, set_online};
