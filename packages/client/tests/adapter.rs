//! Adapter integration tests: two realtime sessions against a live server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use buzzchat_client::{ChatStore, ClientConfig, ClientError, RealtimeClient, StoreChange};
use buzzchat_server::config::RouterConfig;
use buzzchat_server::ui::runner::build_app;
use buzzchat_server::ui::state::AppState;
use buzzchat_shared::{ChatSummary, MessagePayload, UserSummary};

const TYPING_TTL: Duration = Duration::from_secs(3);

/// Give the server a moment to process fire-and-forget events that produce
/// no reply (setup from another session, join chat) before relying on them.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

async fn start_server() -> String {
    let state = Arc::new(AppState::new(RouterConfig::default()));
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });
    format!("ws://{}/ws", addr)
}

fn session(url: &str, user: &str) -> (RealtimeClient, Arc<Mutex<ChatStore>>) {
    let store = Arc::new(Mutex::new(ChatStore::new(user, TYPING_TTL)));
    let client = RealtimeClient::new(ClientConfig::new(url), store.clone());
    (client, store)
}

fn message(id: &str, sender: &str, recipient: &str) -> MessagePayload {
    MessagePayload {
        id: id.to_string(),
        content: "hello".to_string(),
        file_url: None,
        created_at: chrono::Utc::now(),
        sender: UserSummary::new(sender, sender),
        chat: ChatSummary {
            id: "c1".to_string(),
            users: vec![
                UserSummary::new(sender, sender),
                UserSummary::new(recipient, recipient),
            ],
        },
    }
}

async fn wait_for_change(
    changes: &mut tokio::sync::broadcast::Receiver<StoreChange>,
    expected: StoreChange,
) {
    loop {
        let change = tokio::time::timeout(Duration::from_secs(5), changes.recv())
            .await
            .expect("Timed out waiting for store change")
            .expect("Store change channel closed");
        if change == expected {
            return;
        }
    }
}

#[tokio::test]
async fn test_connect_guard_rejects_second_connection() {
    // given: a session that is already connected
    let url = start_server().await;
    let (client, _store) = session(&url, "u1");
    client.connect("u1").await.expect("Failed to connect");

    // when:
    let second = client.connect("u1").await;

    // then:
    assert!(matches!(second, Err(ClientError::AlreadyConnected)));

    // and after an explicit disconnect a new connection is allowed
    client.disconnect().await;
    assert!(!client.is_connected().await);
    client.connect("u1").await.expect("Failed to reconnect");
}

#[tokio::test]
async fn test_emit_without_connection_fails() {
    // given: a session that never connected
    let url = start_server().await;
    let (client, _store) = session(&url, "u1");

    // when / then:
    assert!(matches!(
        client.join_chat("c1").await,
        Err(ClientError::NotConnected)
    ));
}

#[tokio::test]
async fn test_message_announced_by_one_session_lands_in_the_other_store() {
    // given: two identified sessions
    let url = start_server().await;
    let (alice, alice_store) = session(&url, "u1");
    let (bob, bob_store) = session(&url, "u2");
    alice.connect("u1").await.expect("Failed to connect alice");
    bob.connect("u2").await.expect("Failed to connect bob");
    let mut bob_changes = bob_store.lock().await.subscribe();
    settle().await;

    // when: alice announces a persisted message and also applies the REST
    // response to her own store
    let payload = message("m1", "u1", "u2");
    alice_store.lock().await.add_message(payload.clone());
    alice
        .announce_message(payload.clone())
        .await
        .expect("Failed to announce");

    // then: bob's store picks the message up from the push
    wait_for_change(
        &mut bob_changes,
        StoreChange::MessageAdded("m1".to_string()),
    )
    .await;
    assert_eq!(bob_store.lock().await.messages().len(), 1);

    // and a late REST copy of the same message deduplicates
    assert!(!bob_store.lock().await.add_message(payload));
    assert_eq!(bob_store.lock().await.messages().len(), 1);
    // the sender never receives her own push
    assert_eq!(alice_store.lock().await.messages().len(), 1);
}

#[tokio::test]
async fn test_typing_indicator_roundtrip_between_sessions() {
    // given: two sessions in the same chat
    let url = start_server().await;
    let (alice, alice_store) = session(&url, "u1");
    let (bob, _bob_store) = session(&url, "u2");
    alice.connect("u1").await.expect("Failed to connect alice");
    bob.connect("u2").await.expect("Failed to connect bob");
    alice.join_chat("c1").await.expect("Failed to join");
    bob.join_chat("c1").await.expect("Failed to join");
    let mut alice_changes = alice_store.lock().await.subscribe();
    settle().await;

    // when: bob starts typing
    bob.typing("c1").await.expect("Failed to emit typing");

    // then: alice's typing set gains bob
    wait_for_change(
        &mut alice_changes,
        StoreChange::TypingStarted("u2".to_string()),
    )
    .await;
    assert_eq!(
        alice_store.lock().await.typing_users(Instant::now()),
        vec!["u2".to_string()]
    );

    // when: bob stops typing
    bob.stop_typing("c1").await.expect("Failed to emit stop");

    // then: the set converges to empty
    wait_for_change(
        &mut alice_changes,
        StoreChange::TypingStopped("u2".to_string()),
    )
    .await;
    assert!(
        alice_store
            .lock()
            .await
            .typing_users(Instant::now())
            .is_empty()
    );
}

#[tokio::test]
async fn test_presence_propagates_between_sessions() {
    // given: alice connected first
    let url = start_server().await;
    let (alice, alice_store) = session(&url, "u1");
    alice.connect("u1").await.expect("Failed to connect alice");
    let mut alice_changes = alice_store.lock().await.subscribe();

    // when: bob connects and later disconnects
    let (bob, _bob_store) = session(&url, "u2");
    bob.connect("u2").await.expect("Failed to connect bob");
    wait_for_change(&mut alice_changes, StoreChange::UserOnline("u2".to_string())).await;
    assert_eq!(
        alice_store.lock().await.online_users(),
        vec!["u2".to_string()]
    );

    bob.disconnect().await;

    // then: alice sees the offline transition
    wait_for_change(
        &mut alice_changes,
        StoreChange::UserOffline("u2".to_string()),
    )
    .await;
    assert!(alice_store.lock().await.online_users().is_empty());
}
