//! Integration tests for the message store.

use std::sync::Arc;

use std::str::FromStr;

use huddle_channels::{CreateChannelRequest, MessageStore, StoreError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

// A single connection keeps every query on the same in-memory database.
async fn test_pool() -> SqlitePool {
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

    pool
}

async fn test_store() -> MessageStore {
    MessageStore::new(test_pool().await)
}

fn general(store_name: &str) -> CreateChannelRequest {
    CreateChannelRequest {
        group_id: "1".to_string(),
        name: store_name.to_string(),
    }
}

#[tokio::test]
async fn append_then_list_returns_messages_in_call_order() {
    let store = test_store().await;
    let channel = store.create_channel(&general("General")).await.unwrap();

    for i in 0..5 {
        store
            .append(channel.id, "alice", &format!("message {i}"))
            .await
            .unwrap();
    }

    let messages = store.list(channel.id).await.unwrap();
    assert_eq!(messages.len(), 5);

    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message.seq, i as i64, "seq must be dense and 0-based");
        assert_eq!(message.body, format!("message {i}"));
        if i > 0 {
            assert!(
                message.created_at >= messages[i - 1].created_at,
                "timestamps must be non-decreasing"
            );
        }
    }
}

#[tokio::test]
async fn list_on_empty_channel_returns_empty_not_error() {
    let store = test_store().await;
    let channel = store.create_channel(&general("Quiet")).await.unwrap();

    let messages = store.list(channel.id).await.unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn unknown_channel_is_not_found_for_append_and_list() {
    let store = test_store().await;

    let err = store.append(999, "alice", "hi").await.unwrap_err();
    assert!(matches!(err, StoreError::ChannelNotFound { id: 999 }));

    let err = store.list(999).await.unwrap_err();
    assert!(matches!(err, StoreError::ChannelNotFound { id: 999 }));
}

#[tokio::test]
async fn append_after_delete_is_not_found() {
    let store = test_store().await;
    let channel = store.create_channel(&general("Doomed")).await.unwrap();

    store.append(channel.id, "alice", "first").await.unwrap();
    store.delete_channel(channel.id).await.unwrap();

    let err = store.append(channel.id, "alice", "late").await.unwrap_err();
    assert!(err.is_not_found());

    let err = store.list(channel.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_missing_channel_is_not_found() {
    let store = test_store().await;
    let err = store.delete_channel(42).await.unwrap_err();
    assert!(matches!(err, StoreError::ChannelNotFound { id: 42 }));
}

#[tokio::test]
async fn blank_input_is_rejected() {
    let store = test_store().await;
    let channel = store.create_channel(&general("General")).await.unwrap();

    let err = store.append(channel.id, "alice", "   ").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput { .. }));

    let err = store.append(channel.id, "", "hello").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput { .. }));

    let request = CreateChannelRequest {
        group_id: "1".to_string(),
        name: "".to_string(),
    };
    let err = store.create_channel(&request).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput { .. }));
}

#[tokio::test]
async fn concurrent_appends_serialize_into_one_total_order() {
    let store = Arc::new(test_store().await);
    let channel = store.create_channel(&general("Busy")).await.unwrap();

    let writers = ["alice", "bob"].map(|sender| {
        let store = Arc::clone(&store);
        let channel_id = channel.id;
        tokio::spawn(async move {
            for i in 0..10 {
                store
                    .append(channel_id, sender, &format!("{sender} {i}"))
                    .await
                    .unwrap();
            }
        })
    });

    for writer in writers {
        writer.await.unwrap();
    }

    let messages = store.list(channel.id).await.unwrap();
    assert_eq!(messages.len(), 20, "no message may be lost or duplicated");

    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message.seq, i as i64, "log must stay dense");
    }

    // Each writer's own messages keep their submission order.
    for sender in ["alice", "bob"] {
        let bodies: Vec<&str> = messages
            .iter()
            .filter(|m| m.sender == sender)
            .map(|m| m.body.as_str())
            .collect();
        let expected: Vec<String> = (0..10).map(|i| format!("{sender} {i}")).collect();
        assert_eq!(bodies, expected);
    }
}

#[tokio::test]
async fn appends_to_different_channels_are_independent() {
    let store = Arc::new(test_store().await);
    let first = store.create_channel(&general("First")).await.unwrap();
    let second = store.create_channel(&general("Second")).await.unwrap();

    let tasks = [first.id, second.id].map(|channel_id| {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for i in 0..5 {
                store
                    .append(channel_id, "alice", &format!("{i}"))
                    .await
                    .unwrap();
            }
        })
    });

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.list(first.id).await.unwrap().len(), 5);
    assert_eq!(store.list(second.id).await.unwrap().len(), 5);
}

#[tokio::test]
async fn channel_ids_increase_monotonically() {
    let store = test_store().await;
    let a = store.create_channel(&general("A")).await.unwrap();
    let b = store.create_channel(&general("B")).await.unwrap();
    let c = store.create_channel(&general("C")).await.unwrap();

    assert!(a.id < b.id && b.id < c.id);
}

#[tokio::test]
async fn membership_is_idempotent_both_ways() {
    let store = test_store().await;
    let channel = store.create_channel(&general("General")).await.unwrap();

    store.add_member(channel.id, "alice").await.unwrap();
    store.add_member(channel.id, "alice").await.unwrap();
    store.add_member(channel.id, "bob").await.unwrap();

    let channel = store.channel(channel.id).await.unwrap();
    assert_eq!(channel.members, vec!["alice", "bob"]);

    store.remove_member(channel.id, "alice").await.unwrap();
    store.remove_member(channel.id, "alice").await.unwrap();

    let channel = store.channel(channel.id).await.unwrap();
    assert_eq!(channel.members, vec!["bob"]);

    let err = store.add_member(999, "alice").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn channels_by_ids_skips_unknown_ids() {
    let store = test_store().await;
    let a = store.create_channel(&general("A")).await.unwrap();
    let b = store.create_channel(&general("B")).await.unwrap();

    let channels = store.channels_by_ids(&[a.id, 999, b.id]).await.unwrap();
    let ids: Vec<i64> = channels.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);

    let channels = store.channels_by_ids(&[]).await.unwrap();
    assert!(channels.is_empty());
}
