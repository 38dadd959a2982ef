//! Integration tests for the backward pagination cursor

mod common;

use common::{flaky_state, seed_message};
use fadelink::ErrorKind;
use fadelink::feed::{PaginationCursor, SharedView};
use fadelink::repositories::MessageRepository;
use std::sync::Arc;

async fn seed_history(store: &common::FlakyStore, count: usize) {
    for i in 1..=count {
        seed_message(store, "groups", "g1", &format!("msg {i}"), i as i64 * 1_000, None).await;
    }
}

#[tokio::test]
async fn pages_walk_backward_until_exhausted() {
    let (store, state) = flaky_state();
    seed_history(&store, 32).await;

    let view = SharedView::new();
    let cursor = PaginationCursor::new(
        state.group_messages.clone(),
        "g1",
        view.clone(),
        state.config.page_size,
    );

    let first = cursor.load_more().await.unwrap();
    assert_eq!(first.len(), 20);
    assert_eq!(first[0].text, "msg 32");
    assert_eq!(first[19].text, "msg 13");
    assert!(cursor.has_more());

    // a short page exhausts the cursor for the rest of the session
    let second = cursor.load_more().await.unwrap();
    assert_eq!(second.len(), 12);
    assert_eq!(second[11].text, "msg 1");
    assert!(!cursor.has_more());

    assert_eq!(view.len(), 32);

    // exhausted cursor: no messages, and no remote call either
    let queries_before = store.queries();
    let third = cursor.load_more().await.unwrap();
    assert!(third.is_empty());
    assert_eq!(store.queries(), queries_before);
}

#[tokio::test]
async fn concurrent_load_more_is_single_flight() {
    let (store, state) = flaky_state();
    seed_history(&store, 25).await;
    store.set_query_delay_ms(50);

    let cursor = Arc::new(PaginationCursor::new(
        state.group_messages.clone(),
        "g1",
        SharedView::new(),
        state.config.page_size,
    ));

    let queries_before = store.queries();
    let (a, b) = tokio::join!(cursor.load_more(), cursor.load_more());
    let (a, b) = (a.unwrap(), b.unwrap());

    // exactly one of the two performed the fetch
    assert_eq!(store.queries(), queries_before + 1);
    assert_eq!(a.len().max(b.len()), 20);
    assert_eq!(a.len().min(b.len()), 0);
}

#[tokio::test]
async fn fetch_error_leaves_cursor_and_view_intact() {
    let (store, state) = flaky_state();
    seed_history(&store, 25).await;

    let view = SharedView::new();
    let cursor = PaginationCursor::new(
        state.group_messages.clone(),
        "g1",
        view.clone(),
        state.config.page_size,
    );

    let first = cursor.load_more().await.unwrap();
    assert_eq!(first.len(), 20);

    store.set_fail_queries(true);
    let err = cursor.load_more().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transient);
    assert!(cursor.has_more(), "failed fetch must not flip has_more");
    assert_eq!(view.len(), 20, "failed fetch must not touch the view");

    // after the transient failure clears, the cursor resumes where it was
    store.set_fail_queries(false);
    let retried = cursor.load_more().await.unwrap();
    assert_eq!(retried.len(), 5);
    assert_eq!(retried[4].text, "msg 1");
    assert!(!cursor.has_more());
}

#[tokio::test]
async fn cursor_continues_from_live_window() {
    let (store, state) = flaky_state();
    seed_history(&store, 23).await;

    // pretend the live window already delivered the three newest
    let view = SharedView::new();
    let repo: &MessageRepository<common::FlakyStore> = &state.group_messages;
    let newest = repo.find_page("g1", None, 3).await.unwrap();
    view.apply_snapshot(newest);

    let cursor = PaginationCursor::new(
        state.group_messages.clone(),
        "g1",
        view.clone(),
        state.config.page_size,
    );

    let page = cursor.load_more().await.unwrap();
    assert_eq!(page.len(), 20);
    // strictly older than the oldest live message (msg 21)
    assert_eq!(page[0].text, "msg 20");
    assert_eq!(page[19].text, "msg 1");
    assert_eq!(view.len(), 23);
}
