//! Group services - membership and group messaging

use crate::core::{AppError, AppState};
use crate::dtos::{CreateGroupDTO, MAX_GROUP_MEMBERS, SendMessageDTO};
use crate::entities::{Group, Message, MessageKind};
use crate::repositories::{Create, Read};
use crate::store::DocumentStore;
use chrono::{Duration, Utc};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Author of the synthetic membership notices.
const SYSTEM_SENDER: &str = "system";
const SYSTEM_SENDER_NAME: &str = "System";

/// Create a group with the creator as sole member and admin.
#[instrument(skip(state, dto), fields(creator = %dto.created_by))]
pub async fn create_group<S: DocumentStore>(
    state: &AppState<S>,
    dto: CreateGroupDTO,
) -> Result<Group, AppError> {
    dto.validate()?;
    let group = state.group.create(&dto).await?;
    info!(group_id = %group.group_id, name = %group.name, "Group created");
    Ok(group)
}

/// Group by id, or not-found.
pub async fn group_details<S: DocumentStore>(
    state: &AppState<S>,
    group_id: &str,
) -> Result<Group, AppError> {
    state
        .group
        .read(&group_id.to_string())
        .await?
        .ok_or_else(|| AppError::not_found("Group not found"))
}

/// All groups the user is a member of.
#[instrument(skip(state))]
pub async fn user_groups<S: DocumentStore>(
    state: &AppState<S>,
    user_id: &str,
) -> Result<Vec<Group>, AppError> {
    let groups = state.group.find_for_user(user_id).await?;
    debug!(count = groups.len(), "Groups listed");
    Ok(groups)
}

/// Join a group. Joining a group one is already in is a no-op.
#[instrument(skip(state))]
pub async fn join_group<S: DocumentStore>(
    state: &AppState<S>,
    group_id: &str,
    user_id: &str,
) -> Result<(), AppError> {
    if user_id.is_empty() {
        return Err(AppError::validation("User identity is required"));
    }

    let group = group_details(state, group_id).await?;
    if group.is_member(user_id) {
        return Ok(());
    }
    if group.members.len() >= MAX_GROUP_MEMBERS {
        warn!("Join attempted on a full group");
        return Err(AppError::conflict("Group is full."));
    }

    if state.group.add_member(group_id, user_id).await? {
        info!("User joined group");
        send_system_notice(state, group_id, &format!("{user_id} joined the group")).await;
    }
    Ok(())
}

/// Leave a group. Leaving a group one is not in is a no-op.
#[instrument(skip(state))]
pub async fn leave_group<S: DocumentStore>(
    state: &AppState<S>,
    group_id: &str,
    user_id: &str,
) -> Result<(), AppError> {
    if state.group.remove_member(group_id, user_id).await? {
        info!("User left group");
        send_system_notice(state, group_id, &format!("{user_id} left the group")).await;
    }
    Ok(())
}

/// Remove a member, admin only. The creator cannot be removed.
#[instrument(skip(state))]
pub async fn remove_member<S: DocumentStore>(
    state: &AppState<S>,
    group_id: &str,
    actor_id: &str,
    member_id: &str,
) -> Result<(), AppError> {
    let group = group_details(state, group_id).await?;
    if !group.is_admin(actor_id) {
        warn!("Non-admin attempted member removal");
        return Err(AppError::forbidden("Only the group admin can remove members."));
    }
    if group.is_admin(member_id) {
        return Err(AppError::forbidden("The group creator cannot be removed."));
    }

    if state.group.remove_member(group_id, member_id).await? {
        info!("Member removed from group");
        send_system_notice(
            state,
            group_id,
            &format!("{member_id} was removed from the group"),
        )
        .await;
    }
    Ok(())
}

/// Send a message into a group.
///
/// Trim-then-validate happens before any store call. Membership is
/// checked against the current group document. A message sent without
/// an explicit expiry preset inherits the group's default auto-delete
/// duration, when one is set.
#[instrument(skip(state, dto), fields(sender = %dto.sender_id))]
pub async fn send_group_message<S: DocumentStore>(
    state: &AppState<S>,
    group_id: &str,
    mut dto: SendMessageDTO,
) -> Result<Message, AppError> {
    dto.text = dto.text.trim().to_string();
    dto.validate()?;

    let group = group_details(state, group_id).await?;
    if !group.is_member(&dto.sender_id) {
        warn!("Non-member attempted to send into group");
        return Err(AppError::forbidden("Only members can send messages."));
    }

    let now = Utc::now();
    let auto_delete_at = match dto.auto_delete {
        Some(preset) => preset.expires_at(now),
        None => group
            .auto_delete_duration_ms
            .map(|ms| now + Duration::milliseconds(ms)),
    };

    let message = state
        .group_messages
        .create(group_id, &dto, auto_delete_at)
        .await?;
    info!(message_id = %message.message_id, "Group message sent");
    Ok(message)
}

/// Best-effort synthetic membership notice; failures are logged, never
/// propagated to the membership operation that triggered them.
async fn send_system_notice<S: DocumentStore>(state: &AppState<S>, group_id: &str, text: &str) {
    let dto = SendMessageDTO {
        text: text.to_string(),
        sender_id: SYSTEM_SENDER.to_string(),
        sender_name: SYSTEM_SENDER_NAME.to_string(),
        kind: MessageKind::System,
        auto_delete: None,
    };
    if let Err(e) = state.group_messages.create(group_id, &dto, None).await {
        warn!("Failed to write membership notice: {e}");
    }
}
