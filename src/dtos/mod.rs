//! DTOs - validated inputs for the service layer

pub mod chat;
pub mod group;
pub mod message;

pub use chat::CreateChatDTO;
pub use group::{CreateGroupDTO, MAX_GROUP_MEMBERS, MAX_GROUP_NAME_LENGTH};
pub use message::{MAX_MESSAGE_LENGTH, SendMessageDTO};
