//! Integration tests for presence

mod common;

use common::test_state;
use fadelink::ErrorKind;
use fadelink::services::{profile, set_online};
use fadelink::store::{CollectionPath, DocumentStore};
use serde_json::json;

#[tokio::test]
async fn presence_flag_flips_and_stamps_last_seen() {
    let state = test_state();
    let record = state
        .store
        .create(
            &CollectionPath::root("users"),
            json!({ "username": "alice", "email": "alice@example.com" })
                .as_object()
                .unwrap()
                .clone(),
        )
        .await
        .unwrap();

    set_online(&state, &record.id, true).await.unwrap();
    let user = profile(&state, &record.id).await.unwrap().expect("profile");
    assert!(user.online);
    let first_seen = user.last_seen.expect("last_seen stamped");

    set_online(&state, &record.id, false).await.unwrap();
    let user = profile(&state, &record.id).await.unwrap().expect("profile");
    assert!(!user.online);
    assert!(user.last_seen.expect("last_seen stamped") >= first_seen);
}

#[tokio::test]
async fn presence_rejects_bad_input() {
    let state = test_state();

    let err = set_online(&state, "", true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = set_online(&state, "ghost", true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
