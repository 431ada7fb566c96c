//! Realtime session lifecycle: one guarded connection per session.
//!
//! The connection is created explicitly when an identity becomes available
//! and torn down only on logout; nothing tears it down implicitly, so pushes
//! keep arriving while the user navigates the app. A second `connect` on a
//! session that already has a live connection is an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use buzzchat_shared::{ClientEvent, MessagePayload, ServerEvent, TypingPayload};

use crate::error::ClientError;
use crate::store::ChatStore;

/// Client adapter configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint, e.g. `ws://localhost:5000/ws`.
    pub server_url: String,
    /// Local typing-indicator expiry window.
    pub typing_ttl: Duration,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            // matches the UI's historical 3 second stop-typing debounce
            typing_ttl: Duration::from_secs(3),
        }
    }
}

struct ActiveConnection {
    user_id: String,
    outbound: mpsc::UnboundedSender<ClientEvent>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
    sweeper: JoinHandle<()>,
}

/// The session-wide realtime connection plus its reactive store.
pub struct RealtimeClient {
    config: ClientConfig,
    store: Arc<Mutex<ChatStore>>,
    active: Mutex<Option<ActiveConnection>>,
}

impl RealtimeClient {
    pub fn new(config: ClientConfig, store: Arc<Mutex<ChatStore>>) -> Self {
        Self {
            config,
            store,
            active: Mutex::new(None),
        }
    }

    /// Shared handle to the reactive store this session mutates.
    pub fn store(&self) -> Arc<Mutex<ChatStore>> {
        self.store.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Connect the transport and identify as `user_id`.
    ///
    /// Emits `setup` immediately after the transport is established and
    /// spawns the reader, writer and typing-expiry tasks.
    pub async fn connect(&self, user_id: &str) -> Result<(), ClientError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            return Err(ClientError::AlreadyConnected);
        }

        let (socket, _) = connect_async(&self.config.server_url).await?;
        let (mut sink, mut stream) = socket.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ClientEvent>();

        // Serialize queued events onto the socket; a dropped sender ends the
        // loop and closes the socket gracefully.
        let writer = tokio::spawn(async move {
            while let Some(event) = outbound_rx.recv().await {
                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to encode outbound event: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        // Apply inbound events to the store
        let reader_store = self.store.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!("WebSocket error: {}", e);
                        break;
                    }
                };
                match frame {
                    Message::Text(text) => match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            reader_store.lock().await.apply(event, Instant::now());
                        }
                        Err(e) => {
                            tracing::warn!("Dropping malformed server event: {}", e);
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            tracing::info!("realtime connection closed");
        });

        // Bound staleness of peer typing indicators even if no stop typing
        // ever arrives.
        let sweeper_store = self.store.clone();
        let sweep_period = (self.config.typing_ttl / 2).max(Duration::from_millis(100));
        let sweeper = tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_period);
            loop {
                interval.tick().await;
                sweeper_store.lock().await.expire_typing(Instant::now());
            }
        });

        outbound
            .send(ClientEvent::Setup(user_id.to_string()))
            .map_err(|_| ClientError::NotConnected)?;

        *active = Some(ActiveConnection {
            user_id: user_id.to_string(),
            outbound,
            reader,
            writer,
            sweeper,
        });
        tracing::info!(user = user_id, "realtime session connected");
        Ok(())
    }

    /// Tear the connection down. Idempotent: disconnecting a session with no
    /// live connection is a no-op.
    pub async fn disconnect(&self) {
        let Some(connection) = self.active.lock().await.take() else {
            return;
        };
        connection.reader.abort();
        connection.sweeper.abort();
        // Dropping the outbound sender lets the writer drain and close the
        // socket before exiting.
        drop(connection.outbound);
        let _ = connection.writer.await;
        tracing::info!(user = %connection.user_id, "realtime session disconnected");
    }

    /// Queue one event for the server. Fire-and-forget past this point.
    pub async fn emit(&self, event: ClientEvent) -> Result<(), ClientError> {
        let active = self.active.lock().await;
        let connection = active.as_ref().ok_or(ClientError::NotConnected)?;
        connection
            .outbound
            .send(event)
            .map_err(|_| ClientError::NotConnected)
    }

    /// Subscribe to a chat's broadcast traffic.
    pub async fn join_chat(&self, chat_id: &str) -> Result<(), ClientError> {
        self.emit(ClientEvent::JoinChat(chat_id.to_string())).await
    }

    /// Announce a message the REST path has already persisted. The payload
    /// must be the populated message object from the REST response.
    pub async fn announce_message(&self, message: MessagePayload) -> Result<(), ClientError> {
        self.emit(ClientEvent::NewMessage(message)).await
    }

    pub async fn typing(&self, chat_id: &str) -> Result<(), ClientError> {
        let payload = self.typing_payload(chat_id).await?;
        self.emit(ClientEvent::Typing(payload)).await
    }

    pub async fn stop_typing(&self, chat_id: &str) -> Result<(), ClientError> {
        let payload = self.typing_payload(chat_id).await?;
        self.emit(ClientEvent::StopTyping(payload)).await
    }

    pub async fn message_read(&self, message_id: &str) -> Result<(), ClientError> {
        self.emit(ClientEvent::MessageRead(message_id.to_string()))
            .await
    }

    async fn typing_payload(&self, chat_id: &str) -> Result<TypingPayload, ClientError> {
        let active = self.active.lock().await;
        let connection = active.as_ref().ok_or(ClientError::NotConnected)?;
        Ok(TypingPayload {
            chat_id: chat_id.to_string(),
            user_id: connection.user_id.clone(),
        })
    }
}

impl Drop for RealtimeClient {
    fn drop(&mut self) {
        // Best effort: abort background tasks if the session is dropped
        // without an explicit disconnect.
        if let Ok(mut active) = self.active.try_lock() {
            if let Some(connection) = active.take() {
                connection.reader.abort();
                connection.writer.abort();
                connection.sweeper.abort();
            }
        }
    }
}
