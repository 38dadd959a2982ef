//! Chat services - operations on direct chats

use crate::core::{AppError, AppState};
use crate::dtos::{CreateChatDTO, SendMessageDTO};
use crate::entities::{Chat, Message};
use crate::expiry::AutoDeletePreset;
use crate::repositories::{Create, Read, chat::decode_chats};
use crate::store::{DocumentStore, Record, Subscription};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Create the direct chat between two users.
///
/// Exactly one direct chat may exist per pair; a second attempt is a
/// conflict. Validation happens before any store call.
#[instrument(skip(state, dto))]
pub async fn create_chat<S: DocumentStore>(
    state: &AppState<S>,
    dto: CreateChatDTO,
) -> Result<Chat, AppError> {
    dto.validate()?;
    let (a, b) = (&dto.participants[0], &dto.participants[1]);
    if a == b {
        warn!("Chat creation attempted with a single participant twice");
        return Err(AppError::validation(
            "A direct chat needs two distinct participants.",
        ));
    }

    if state.chat.find_between(a, b).await?.is_some() {
        warn!("Direct chat already exists between {} and {}", a, b);
        return Err(AppError::conflict(
            "A direct chat between these users already exists.",
        ));
    }

    let chat = state.chat.create(&dto).await?;
    info!(chat_id = %chat.chat_id, "Direct chat created");
    Ok(chat)
}

/// The existing direct chat between two users, if any.
pub async fn find_existing_chat<S: DocumentStore>(
    state: &AppState<S>,
    user_a: &str,
    user_b: &str,
) -> Result<Option<Chat>, AppError> {
    Ok(state.chat.find_between(user_a, user_b).await?)
}

/// All chats the user participates in.
#[instrument(skip(state))]
pub async fn user_chats<S: DocumentStore>(
    state: &AppState<S>,
    user_id: &str,
) -> Result<Vec<Chat>, AppError> {
    let chats = state.chat.find_for_user(user_id).await?;
    debug!(count = chats.len(), "Chats listed");
    Ok(chats)
}

/// Live subscription to the user's chat list. Decode snapshots with
/// [`chats_from_snapshot`].
pub fn subscribe_user_chats<S: DocumentStore>(state: &AppState<S>, user_id: &str) -> Subscription {
    state.chat.subscribe_for_user(user_id)
}

/// Decode a chat-list snapshot, skipping malformed records.
pub fn chats_from_snapshot(records: &[Record]) -> Vec<Chat> {
    decode_chats(records)
}

/// Send a message into a direct chat.
///
/// Text is trimmed, then validated; empty or whitespace-only input is
/// rejected with zero remote calls. The expiry instant is derived from
/// the preset table at send time. After the message commits, the chat's
/// denormalized preview is rewritten; that preview is eventually
/// consistent, so a failure there is logged and does not fail the send.
#[instrument(skip(state, dto), fields(sender = %dto.sender_id))]
pub async fn send_chat_message<S: DocumentStore>(
    state: &AppState<S>,
    chat_id: &str,
    mut dto: SendMessageDTO,
) -> Result<Message, AppError> {
    dto.text = dto.text.trim().to_string();
    dto.validate()?;

    state
        .chat
        .read(&chat_id.to_string())
        .await?
        .ok_or_else(|| AppError::not_found("Chat not found"))?;

    let auto_delete_at = dto
        .auto_delete
        .and_then(|preset: AutoDeletePreset| preset.expires_at(Utc::now()));

    let message = state.chat_messages.create(chat_id, &dto, auto_delete_at).await?;
    info!(message_id = %message.message_id, "Message sent");

    if let Err(e) = state.chat.set_last_message(chat_id, &message.text).await {
        warn!("Failed to update chat preview: {e}");
    }

    Ok(message)
}

/// Explicit user deletion of a single message.
#[instrument(skip(state))]
pub async fn delete_chat_message<S: DocumentStore>(
    state: &AppState<S>,
    chat_id: &str,
    message_id: &str,
) -> Result<(), AppError> {
    use crate::repositories::Delete;
    state
        .chat_messages
        .delete(&(chat_id.to_string(), message_id.to_string()))
        .await?;
    info!("Message deleted");
    Ok(())
}

/// Acknowledge a message on behalf of `reader_id`.
#[instrument(skip(state))]
pub async fn mark_chat_message_read<S: DocumentStore>(
    state: &AppState<S>,
    chat_id: &str,
    message_id: &str,
    reader_id: &str,
) -> Result<(), AppError> {
    if reader_id.is_empty() {
        return Err(AppError::validation("Reader identity is required"));
    }
    state
        .chat_messages
        .mark_read(chat_id, message_id, reader_id)
        .await?;
    Ok(())
}
