//! Integration tests for group membership and messaging

mod common;

use common::test_state;
use fadelink::dtos::{CreateGroupDTO, SendMessageDTO};
use fadelink::entities::{Message, MessageKind};
use fadelink::services::*;
use fadelink::store::{CollectionPath, DocumentStore, Query};
use fadelink::{AutoDeletePreset, ErrorKind};
use chrono::Utc;

fn group_dto(name: &str, creator: &str) -> CreateGroupDTO {
    CreateGroupDTO {
        name: name.to_string(),
        created_by: creator.to_string(),
        auto_delete: None,
    }
}

async fn group_messages(
    state: &fadelink::AppState<fadelink::MemoryStore>,
    group_id: &str,
) -> Vec<Message> {
    let collection = CollectionPath::root("groups").doc(group_id).collection("messages");
    let records = state.store.query(&collection, Query::all()).await.unwrap();
    let now = Utc::now();
    records.iter().map(|r| Message::from_record(r, now)).collect()
}

#[tokio::test]
async fn creator_is_sole_member_and_admin() {
    let state = test_state();
    let group = create_group(&state, group_dto("weekend hikers", "alice"))
        .await
        .unwrap();

    assert_eq!(group.members, vec!["alice".to_string()]);
    assert!(group.is_admin("alice"));
    assert!(!group.is_admin("bob"));

    let groups = user_groups(&state, "alice").await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "weekend hikers");
}

#[tokio::test]
async fn group_name_is_validated_before_any_write() {
    let state = test_state();
    let err = create_group(&state, group_dto("bad/name", "alice"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(user_groups(&state, "alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn join_and_leave_emit_system_notices() {
    let state = test_state();
    let group = create_group(&state, group_dto("book club", "alice"))
        .await
        .unwrap();

    join_group(&state, &group.group_id, "bob").await.unwrap();
    let details = group_details(&state, &group.group_id).await.unwrap();
    assert!(details.is_member("bob"));

    let messages = group_messages(&state, &group.group_id).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, MessageKind::System);
    assert_eq!(messages[0].text, "bob joined the group");
    assert_eq!(messages[0].sender_id, "system");

    leave_group(&state, &group.group_id, "bob").await.unwrap();
    let details = group_details(&state, &group.group_id).await.unwrap();
    assert!(!details.is_member("bob"));

    let messages = group_messages(&state, &group.group_id).await;
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().any(|m| m.text == "bob left the group"));
}

#[tokio::test]
async fn joining_twice_is_a_noop() {
    let state = test_state();
    let group = create_group(&state, group_dto("book club", "alice"))
        .await
        .unwrap();

    join_group(&state, &group.group_id, "bob").await.unwrap();
    join_group(&state, &group.group_id, "bob").await.unwrap();

    let details = group_details(&state, &group.group_id).await.unwrap();
    assert_eq!(details.members, vec!["alice".to_string(), "bob".to_string()]);
    // only one membership notice was written
    assert_eq!(group_messages(&state, &group.group_id).await.len(), 1);
}

#[tokio::test]
async fn member_removal_is_admin_only() {
    let state = test_state();
    let group = create_group(&state, group_dto("ops", "alice")).await.unwrap();
    join_group(&state, &group.group_id, "bob").await.unwrap();
    join_group(&state, &group.group_id, "carol").await.unwrap();

    let err = remove_member(&state, &group.group_id, "bob", "carol")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = remove_member(&state, &group.group_id, "alice", "alice")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    remove_member(&state, &group.group_id, "alice", "carol")
        .await
        .unwrap();
    let details = group_details(&state, &group.group_id).await.unwrap();
    assert!(!details.is_member("carol"));
    assert!(
        group_messages(&state, &group.group_id)
            .await
            .iter()
            .any(|m| m.text == "carol was removed from the group")
    );
}

#[tokio::test]
async fn group_default_expiry_applies_when_sender_gives_none() {
    let state = test_state();
    let group = create_group(
        &state,
        CreateGroupDTO {
            name: "ephemeral room".to_string(),
            created_by: "alice".to_string(),
            auto_delete: Some(AutoDeletePreset::OneHour),
        },
    )
    .await
    .unwrap();
    assert_eq!(group.auto_delete_duration_ms, Some(3_600_000));

    let inherited = send_group_message(
        &state,
        &group.group_id,
        SendMessageDTO::text("alice", "Alice", "fades in an hour"),
    )
    .await
    .unwrap();
    let delta = (inherited.auto_delete_at.unwrap() - inherited.timestamp).num_milliseconds();
    assert!((3_595_000..=3_605_000).contains(&delta), "got {delta}ms");

    // an explicit preset wins over the group default
    let explicit = send_group_message(
        &state,
        &group.group_id,
        SendMessageDTO::text("alice", "Alice", "fades in a minute")
            .with_auto_delete(AutoDeletePreset::OneMinute),
    )
    .await
    .unwrap();
    let delta = (explicit.auto_delete_at.unwrap() - explicit.timestamp).num_milliseconds();
    assert!((55_000..=65_000).contains(&delta), "got {delta}ms");
}

#[tokio::test]
async fn only_members_can_send() {
    let state = test_state();
    let group = create_group(&state, group_dto("private", "alice"))
        .await
        .unwrap();

    let err = send_group_message(
        &state,
        &group.group_id,
        SendMessageDTO::text("mallory", "Mallory", "let me in"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = send_group_message(
        &state,
        "no-such-group",
        SendMessageDTO::text("alice", "Alice", "hello?"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
