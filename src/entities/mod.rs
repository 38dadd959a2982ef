//! Entities - domain records as materialized from the document store

pub mod chat;
pub mod enums;
pub mod group;
pub mod message;
pub mod user;

pub use chat::{Chat, LastMessage};
pub use enums::{MemberRole, MessageKind};
pub use group::Group;
pub use message::Message;
pub use user::UserProfile;
