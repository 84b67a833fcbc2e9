//! Integration tests for the messaging gateway, room registry, and session
//! state machine working together.

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::sync::mpsc;
use uuid::Uuid;

use huddle_channels::{CreateChannelRequest, StoreError};
use huddle_gateway::{ChatGateway, ServerEvent, Session, SessionId, SESSION_BUFFER};

async fn test_gateway() -> Arc<ChatGateway> {
    // A single connection keeps every query on the same in-memory database.
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("parse sqlite url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("connect to in-memory sqlite");

    huddle_database::run_migrations(&pool)
        .await
        .expect("run migrations");

    Arc::new(ChatGateway::new(pool))
}

async fn create_channel(gateway: &ChatGateway, name: &str) -> i64 {
    gateway
        .create_channel(&CreateChannelRequest {
            group_id: "1".to_string(),
            name: name.to_string(),
        })
        .await
        .expect("create channel")
        .id
}

fn listener() -> (
    SessionId,
    mpsc::Sender<ServerEvent>,
    mpsc::Receiver<ServerEvent>,
) {
    let (tx, rx) = mpsc::channel(SESSION_BUFFER);
    (Uuid::new_v4(), tx, rx)
}

fn expect_message(event: ServerEvent) -> (i64, String, String) {
    match event {
        ServerEvent::Message {
            seq, sender, text, ..
        } => (seq, sender, text),
        other => panic!("expected message event, got {other:?}"),
    }
}

#[tokio::test]
async fn send_is_visible_in_history_before_broadcast_arrives() {
    let gateway = test_gateway().await;
    let channel_id = create_channel(&gateway, "General").await;

    let (id, tx, mut rx) = listener();
    gateway.registry().join(channel_id, id, tx).await;

    let sent = gateway
        .send_message(channel_id, "alice", "hi")
        .await
        .unwrap();

    let (seq, sender, text) = expect_message(rx.try_recv().unwrap());
    assert_eq!((seq, sender.as_str(), text.as_str()), (0, "alice", "hi"));

    // The history a client polls after receiving the broadcast can never be
    // shorter than what was broadcast.
    let history = gateway.load_history(channel_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], sent);
}

#[tokio::test]
async fn broadcast_reaches_all_room_members_and_skips_dropped_ones() {
    let gateway = test_gateway().await;
    let channel_id = create_channel(&gateway, "General").await;

    let (a_id, a_tx, mut a_rx) = listener();
    let (b_id, b_tx, mut b_rx) = listener();
    gateway.registry().join(channel_id, a_id, a_tx).await;
    gateway.registry().join(channel_id, b_id, b_tx).await;

    gateway
        .send_message(channel_id, "alice", "hello")
        .await
        .unwrap();

    expect_message(a_rx.try_recv().unwrap());
    expect_message(b_rx.try_recv().unwrap());

    // B disconnects; only A hears the second message.
    gateway.registry().drop_session(b_id).await;

    gateway
        .send_message(channel_id, "alice", "again")
        .await
        .unwrap();

    let (seq, _, text) = expect_message(a_rx.try_recv().unwrap());
    assert_eq!((seq, text.as_str()), (1, "again"));
    assert!(b_rx.try_recv().is_err());
}

#[tokio::test]
async fn send_to_unknown_channel_fails_without_fanout() {
    let gateway = test_gateway().await;

    let err = gateway.send_message(404, "alice", "hi").await.unwrap_err();
    assert!(matches!(err, StoreError::ChannelNotFound { id: 404 }));
}

#[tokio::test]
async fn dead_receiver_is_evicted_during_fanout_and_sender_sees_success() {
    let gateway = test_gateway().await;
    let channel_id = create_channel(&gateway, "General").await;

    let (dead_id, dead_tx, dead_rx) = listener();
    let (live_id, live_tx, mut live_rx) = listener();
    gateway.registry().join(channel_id, dead_id, dead_tx).await;
    gateway.registry().join(channel_id, live_id, live_tx).await;
    drop(dead_rx);

    gateway
        .send_message(channel_id, "alice", "hello")
        .await
        .expect("fan-out failure must not surface to the sender");

    expect_message(live_rx.try_recv().unwrap());
    assert_eq!(gateway.registry().room_size(channel_id).await, 1);
}

#[tokio::test]
async fn delete_channel_evicts_the_live_room() {
    let gateway = test_gateway().await;
    let channel_id = create_channel(&gateway, "Doomed").await;

    let (id, tx, mut rx) = listener();
    gateway.registry().join(channel_id, id, tx).await;

    gateway.delete_channel(channel_id).await.unwrap();

    let err = gateway.send_message(channel_id, "alice", "hi").await.unwrap_err();
    assert!(matches!(err, StoreError::ChannelNotFound { .. }));
    assert!(rx.try_recv().is_err());
    assert_eq!(gateway.registry().room_size(channel_id).await, 0);
}

#[tokio::test]
async fn concurrent_sends_broadcast_in_log_order() {
    let gateway = test_gateway().await;
    let channel_id = create_channel(&gateway, "Busy").await;

    let (id, tx, mut rx) = listener();
    gateway.registry().join(channel_id, id, tx).await;

    let writers = ["alice", "bob"].map(|sender| {
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move {
            for i in 0..10 {
                gateway
                    .send_message(channel_id, sender, &format!("{sender} {i}"))
                    .await
                    .unwrap();
            }
        })
    });

    for writer in writers {
        writer.await.unwrap();
    }

    let mut seqs = Vec::new();
    while let Ok(event) = rx.try_recv() {
        let (seq, _, _) = expect_message(event);
        seqs.push(seq);
    }

    // Delivery order must equal append order, with nothing lost.
    assert_eq!(seqs, (0..20).collect::<Vec<i64>>());
}

mod session_machine {
    use super::*;

    async fn joined_session(
        gateway: &Arc<ChatGateway>,
        channel_id: i64,
        username: &str,
    ) -> (Session, mpsc::Receiver<ServerEvent>) {
        let (tx, mut rx) = mpsc::channel(SESSION_BUFFER);
        let mut session = Session::new(Arc::clone(gateway), tx);
        session.on_join(channel_id, username).await;

        match rx.try_recv().unwrap() {
            ServerEvent::Joined { channel_id: id } => assert_eq!(id, channel_id),
            other => panic!("expected joined ack, got {other:?}"),
        }

        (session, rx)
    }

    #[tokio::test]
    async fn join_notifies_existing_members_but_not_the_joiner() {
        let gateway = test_gateway().await;
        let channel_id = create_channel(&gateway, "General").await;

        let (_alice, mut alice_rx) = joined_session(&gateway, channel_id, "alice").await;
        let (_bob, mut bob_rx) = joined_session(&gateway, channel_id, "bob").await;

        match alice_rx.try_recv().unwrap() {
            ServerEvent::Notice { text, .. } => {
                assert_eq!(text, "bob has joined the channel.");
            }
            other => panic!("expected notice, got {other:?}"),
        }

        // Bob saw only his own ack, not his own join notice.
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn leave_notifies_remaining_members_only() {
        let gateway = test_gateway().await;
        let channel_id = create_channel(&gateway, "General").await;

        let (_alice, mut alice_rx) = joined_session(&gateway, channel_id, "alice").await;
        let (mut bob, mut bob_rx) = joined_session(&gateway, channel_id, "bob").await;
        let _ = alice_rx.try_recv(); // bob's join notice

        bob.on_leave(channel_id, "bob").await;

        match alice_rx.try_recv().unwrap() {
            ServerEvent::Notice { text, .. } => {
                assert_eq!(text, "bob has left the channel.");
            }
            other => panic!("expected notice, got {other:?}"),
        }

        match bob_rx.try_recv().unwrap() {
            ServerEvent::Left { .. } => {}
            other => panic!("expected left ack, got {other:?}"),
        }
        assert!(bob_rx.try_recv().is_err(), "leaver hears no leave notice");
    }

    #[tokio::test]
    async fn double_join_delivers_broadcasts_once() {
        let gateway = test_gateway().await;
        let channel_id = create_channel(&gateway, "General").await;

        let (mut session, mut rx) = joined_session(&gateway, channel_id, "alice").await;
        session.on_join(channel_id, "alice").await;
        let _ = rx.try_recv(); // second joined ack

        gateway
            .send_message(channel_id, "bob", "hello")
            .await
            .unwrap();

        expect_message(rx.try_recv().unwrap());
        assert!(rx.try_recv().is_err(), "no duplicate delivery after re-join");
    }

    #[tokio::test]
    async fn join_of_unknown_channel_reports_an_error_frame() {
        let gateway = test_gateway().await;
        let (tx, mut rx) = mpsc::channel(SESSION_BUFFER);
        let mut session = Session::new(Arc::clone(&gateway), tx);

        session.on_join(404, "alice").await;

        match rx.try_recv().unwrap() {
            ServerEvent::Error { code, .. } => assert_eq!(code, "not_found"),
            other => panic!("expected error frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failing_send_reports_on_this_session_only() {
        let gateway = test_gateway().await;
        let channel_id = create_channel(&gateway, "General").await;

        let (mut session, mut rx) = joined_session(&gateway, channel_id, "alice").await;

        session.on_send(channel_id, "alice", "   ").await;

        match rx.try_recv().unwrap() {
            ServerEvent::Error { code, .. } => assert_eq!(code, "invalid_input"),
            other => panic!("expected error frame, got {other:?}"),
        }

        let history = gateway.load_history(channel_id).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn disconnect_is_terminal_and_idempotent() {
        let gateway = test_gateway().await;
        let channel_id = create_channel(&gateway, "General").await;

        let (mut session, mut rx) = joined_session(&gateway, channel_id, "alice").await;

        session.on_disconnect().await;
        assert_eq!(gateway.registry().room_size(channel_id).await, 0);

        // A second disconnect and any later events are discarded.
        session.on_disconnect().await;
        session.on_join(channel_id, "alice").await;
        session.on_send(channel_id, "alice", "too late").await;

        assert!(rx.try_recv().is_err());
        let history = gateway.load_history(channel_id).await.unwrap();
        assert!(history.is_empty());
    }
}
