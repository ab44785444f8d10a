//! End-to-end synchronization tests
//!
//! Drive the full loop — snapshot seed, live stream, local writes — against
//! the in-process mock backend.
//!
//! Run with: cargo test -p integration-tests --test sync_tests

use std::sync::Arc;
use std::time::Duration;

use integration_tests::fixtures::*;
use integration_tests::{wait_until, MockBackend};
use sync_client::{ConnectionSupervisor, ThreadSyncSession};
use sync_common::SyncConfig;
use sync_core::{CommentId, TicketId, UserId};
use tokio::sync::mpsc;

const WAIT: Duration = Duration::from_secs(5);

fn config_for(backend: &MockBackend, reconnect_ms: u64) -> Arc<SyncConfig> {
    let mut config = SyncConfig::for_base_url(backend.base_url());
    config.stream.reconnect_delay_ms = reconnect_ms;
    Arc::new(config)
}

async fn open_session(backend: &MockBackend, reconnect_ms: u64) -> ThreadSyncSession {
    let session =
        ThreadSyncSession::new(TicketId::new(7), config_for(backend, reconnect_ms)).unwrap();
    session.start().await.expect("session start");
    assert!(
        wait_until(WAIT, || session.is_live()).await,
        "stream never went live"
    );
    session
}

// ============================================================================
// Snapshot seeding
// ============================================================================

#[tokio::test]
async fn test_snapshot_seeds_tree_and_pagination() {
    let backend = MockBackend::start(envelope(
        vec![root_comment(1, "first"), root_comment(2, "second")],
        23,
    ))
    .await
    .unwrap();

    let session = open_session(&backend, 3000).await;

    let thread = session.snapshot();
    assert_eq!(thread.roots.len(), 2);
    assert_eq!(thread.pagination.count, 23);
    assert_eq!(thread.pagination.total_pages, 3);

    session.stop();
}

// ============================================================================
// Stream merging
// ============================================================================

#[tokio::test]
async fn test_reply_redelivery_and_delete_scenario() {
    // Snapshot returns root 1. The stream delivers a reply, redelivers the
    // identical frame (reconnect replay), then deletes the reply.
    let backend = MockBackend::start(envelope(vec![root_comment(1, "root")], 1))
        .await
        .unwrap();
    let session = open_session(&backend, 3000).await;

    backend.send_frame(frame("reply", reply_comment(2, 1, "a reply")));
    assert!(
        wait_until(WAIT, || {
            session
                .snapshot()
                .find(CommentId::new(1))
                .is_some_and(|c| c.replies.len() == 1)
        })
        .await
    );

    backend.send_frame(frame("reply", reply_comment(2, 1, "a reply")));
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(
        session.snapshot().find(CommentId::new(1)).unwrap().replies.len(),
        1,
        "redelivered reply must not duplicate"
    );

    backend.send_frame(frame("delete", reply_comment(2, 1, "a reply")));
    assert!(
        wait_until(WAIT, || {
            session
                .snapshot()
                .find(CommentId::new(1))
                .is_some_and(|c| c.replies.is_empty())
        })
        .await
    );

    session.stop();
}

#[tokio::test]
async fn test_orphan_reply_is_dropped() {
    let backend = MockBackend::start(envelope(vec![root_comment(1, "root")], 1))
        .await
        .unwrap();
    let session = open_session(&backend, 3000).await;

    backend.send_frame(frame("reply", reply_comment(5, 99, "orphan")));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let thread = session.snapshot();
    assert!(!thread.contains(CommentId::new(5)));
    assert_eq!(thread.roots.len(), 1);

    session.stop();
}

#[tokio::test]
async fn test_live_root_create_updates_pagination() {
    let backend = MockBackend::start(envelope(vec![root_comment(1, "root")], 23))
        .await
        .unwrap();
    let session = open_session(&backend, 3000).await;

    backend.send_frame(frame("create", root_comment(50, "breaking news")));
    assert!(
        wait_until(WAIT, || session.snapshot().contains(CommentId::new(50))).await
    );

    let thread = session.snapshot();
    // Newest-first root ordering
    assert_eq!(thread.roots[0].id, CommentId::new(50));
    assert_eq!(thread.pagination.count, 24);
    assert_eq!(thread.pagination.total_pages, 3);

    session.stop();
}

#[tokio::test]
async fn test_rate_frames_replace_reactions_exclusively() {
    let backend = MockBackend::start(envelope(vec![root_comment(1, "root")], 1))
        .await
        .unwrap();
    let session = open_session(&backend, 3000).await;

    backend.send_frame(frame(
        "rate",
        rated_comment(1, serde_json::json!([{"user_id": 5, "rating": "👍"}])),
    ));
    assert!(
        wait_until(WAIT, || {
            session
                .snapshot()
                .find(CommentId::new(1))
                .is_some_and(|c| !c.reactions.is_empty())
        })
        .await
    );

    // The same user switches symbols; the confirmed comment replaces in full
    backend.send_frame(frame(
        "rate",
        rated_comment(1, serde_json::json!([{"user_id": 5, "rating": "👎"}])),
    ));
    assert!(
        wait_until(WAIT, || {
            session
                .snapshot()
                .find(CommentId::new(1))
                .is_some_and(|c| c.reactions.len() == 1 && c.reactions[0].symbol == "👎")
        })
        .await
    );

    session.stop();
}

#[tokio::test]
async fn test_malformed_frames_leave_connection_and_tree_intact() {
    let backend = MockBackend::start(envelope(vec![root_comment(1, "root")], 1))
        .await
        .unwrap();
    let session = open_session(&backend, 3000).await;

    backend.send_frame("not json at all");
    backend.send_frame(r#"{"type": "presence_update", "action": "create", "comment": {"id": 9}}"#);
    backend.send_frame(frame("create", serde_json::json!({"content": "no id"})));

    // A well-formed frame after the garbage still applies
    backend.send_frame(frame("create", root_comment(2, "still alive")));
    assert!(
        wait_until(WAIT, || session.snapshot().contains(CommentId::new(2))).await
    );

    assert!(session.is_live());
    assert!(!session.snapshot().contains(CommentId::new(9)));

    session.stop();
}

// ============================================================================
// Local writes through the dispatcher
// ============================================================================

#[tokio::test]
async fn test_local_create_confirmation_and_stream_echo_apply_once() {
    let backend = MockBackend::start(envelope(vec![], 0)).await.unwrap();
    let session = open_session(&backend, 3000).await;

    // The mock assigns id 100 to the first created comment
    session.create_comment(UserId::new(1), "hello there").await.unwrap();
    assert!(
        wait_until(WAIT, || session.snapshot().contains(CommentId::new(100))).await
    );

    // The stream echoes the confirmed mutation back; the engine absorbs it
    backend.send_frame(frame("create", root_comment(100, "hello there")));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let thread = session.snapshot();
    assert_eq!(thread.roots.len(), 1);
    assert_eq!(thread.pagination.count, 1);

    session.stop();
}

#[tokio::test]
async fn test_local_reply_and_delete_round_trip() {
    let backend = MockBackend::start(envelope(vec![root_comment(1, "root")], 1))
        .await
        .unwrap();
    let session = open_session(&backend, 3000).await;

    session
        .add_reply(UserId::new(1), CommentId::new(1), "my reply")
        .await
        .unwrap();
    assert!(
        wait_until(WAIT, || {
            session
                .snapshot()
                .find(CommentId::new(1))
                .is_some_and(|c| c.replies.len() == 1)
        })
        .await
    );

    session.delete_comment(CommentId::new(100)).await.unwrap();
    assert!(
        wait_until(WAIT, || {
            session
                .snapshot()
                .find(CommentId::new(1))
                .is_some_and(|c| c.replies.is_empty())
        })
        .await
    );

    session.stop();
}

#[tokio::test]
async fn test_local_reaction_set_and_clear() {
    let backend = MockBackend::start(envelope(vec![root_comment(1, "root")], 1))
        .await
        .unwrap();
    let session = open_session(&backend, 3000).await;

    session
        .set_reaction(CommentId::new(1), UserId::new(9), "👍")
        .await
        .unwrap();
    assert!(
        wait_until(WAIT, || {
            session
                .snapshot()
                .find(CommentId::new(1))
                .is_some_and(|c| c.reaction_of(UserId::new(9)).is_some())
        })
        .await
    );

    session
        .clear_reaction(CommentId::new(1), UserId::new(9))
        .await
        .unwrap();
    assert!(
        wait_until(WAIT, || {
            session
                .snapshot()
                .find(CommentId::new(1))
                .is_some_and(|c| c.reactions.is_empty())
        })
        .await
    );

    session.stop();
}

#[tokio::test]
async fn test_download_attachment_returns_bytes() {
    let backend = MockBackend::start(envelope(vec![], 0)).await.unwrap();
    let session = open_session(&backend, 3000).await;

    let bytes = session
        .download_attachment(sync_core::DocumentId::new(3))
        .await
        .unwrap();
    assert_eq!(bytes, b"%PDF-mock");

    session.stop();
}

// ============================================================================
// Reconnect behavior
// ============================================================================

#[tokio::test]
async fn test_abnormal_close_reconnects_after_delay() {
    let backend = MockBackend::start(envelope(vec![root_comment(1, "root")], 1))
        .await
        .unwrap();
    let session = open_session(&backend, 200).await;

    // Abrupt drop: the client observes a 1006-style abnormal closure
    backend.drop_stream();
    assert!(wait_until(WAIT, || !session.is_live()).await);

    // One timer, one new connection
    assert!(wait_until(WAIT, || session.is_live()).await);

    // The reconnected stream still feeds the same tree
    backend.send_frame(frame("create", root_comment(2, "after reconnect")));
    assert!(
        wait_until(WAIT, || session.snapshot().contains(CommentId::new(2))).await
    );

    session.stop();
}

#[tokio::test]
async fn test_server_error_close_code_reconnects() {
    let backend = MockBackend::start(envelope(vec![root_comment(1, "root")], 1))
        .await
        .unwrap();
    let session = open_session(&backend, 200).await;

    backend.close_stream(1011);
    assert!(wait_until(WAIT, || !session.is_live()).await);
    assert!(wait_until(WAIT, || session.is_live()).await);

    session.stop();
}

#[tokio::test]
async fn test_normal_close_code_stays_closed() {
    let backend = MockBackend::start(envelope(vec![root_comment(1, "root")], 1))
        .await
        .unwrap();
    let session = open_session(&backend, 200).await;

    backend.close_stream(1000);
    assert!(wait_until(WAIT, || !session.is_live()).await);

    // 1000 is reserved for intentional closure; no resurrect
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(!session.is_live());

    session.stop();
}

#[tokio::test]
async fn test_intentional_close_cancels_pending_reconnect() {
    let backend = MockBackend::start(envelope(vec![root_comment(1, "root")], 1))
        .await
        .unwrap();

    let (events_tx, mut events_rx) = mpsc::channel(8);
    let supervisor =
        ConnectionSupervisor::new(TicketId::new(7), &config_for(&backend, 60_000), events_tx)
            .unwrap();
    tokio::spawn(async move { while events_rx.recv().await.is_some() {} });

    supervisor.connect();
    assert!(wait_until(WAIT, || supervisor.is_live()).await);

    backend.drop_stream();
    assert!(wait_until(WAIT, || !supervisor.is_live()).await);
    assert!(
        wait_until(WAIT, || supervisor.has_pending_reconnect()).await,
        "abnormal close must schedule exactly one reconnect"
    );

    // Intentional shutdown before the timer fires cancels it for good
    supervisor.disconnect();
    assert!(!supervisor.has_pending_reconnect());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!supervisor.is_live());
    assert!(!supervisor.has_pending_reconnect());
}

#[tokio::test]
async fn test_duplicate_connect_calls_open_one_connection() {
    let backend = MockBackend::start(envelope(vec![root_comment(1, "root")], 1))
        .await
        .unwrap();

    let (events_tx, mut events_rx) = mpsc::channel(8);
    let supervisor =
        ConnectionSupervisor::new(TicketId::new(7), &config_for(&backend, 3000), events_tx)
            .unwrap();
    tokio::spawn(async move { while events_rx.recv().await.is_some() {} });

    // Rapid re-invocation, as a re-rendering consumer would do
    supervisor.connect();
    supervisor.connect();
    supervisor.connect();

    assert!(wait_until(WAIT, || supervisor.is_live()).await);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(supervisor.is_live());
    assert!(!supervisor.has_pending_reconnect());

    supervisor.disconnect();
}
