//! Test fixtures: boot the real app on an ephemeral port and drive it with
//! plain HTTP and WebSocket clients.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use buzzchat_server::config::RouterConfig;
use buzzchat_server::ui::runner::{build_app, spawn_typing_sweep};
use buzzchat_server::ui::state::AppState;
use buzzchat_shared::{ClientEvent, ServerEvent};

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);
pub const SILENCE_WINDOW: Duration = Duration::from_millis(300);

/// Give the server a moment to process fire-and-forget events that produce
/// no reply (join chat, close frames) before asserting on their effects.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    pub async fn start(config: RouterConfig) -> Self {
        let state = Arc::new(AppState::new(config));
        let app = build_app(state.clone());
        if let Some(ttl) = config.typing_sweep_ttl {
            spawn_typing_sweep(state, ttl);
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });

        Self { addr }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

/// One WebSocket client connection speaking the realtime contract.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn connect(server: &TestServer) -> Self {
        let (stream, _) = connect_async(server.ws_url())
            .await
            .expect("Failed to connect websocket");
        Self { stream }
    }

    pub async fn send(&mut self, event: &ClientEvent) {
        let json = serde_json::to_string(event).expect("Failed to encode event");
        self.stream
            .send(Message::text(json))
            .await
            .expect("Failed to send frame");
    }

    /// Next decoded server event, failing the test after a timeout.
    pub async fn recv(&mut self) -> ServerEvent {
        tokio::time::timeout(RECV_TIMEOUT, self.next_event())
            .await
            .expect("Timed out waiting for server event")
            .expect("Connection closed while waiting for server event")
    }

    /// Assert that no server event arrives within the silence window.
    pub async fn expect_silence(&mut self) {
        match tokio::time::timeout(SILENCE_WINDOW, self.next_event()).await {
            Err(_) => {}
            Ok(Some(event)) => panic!("Expected silence, got {:?}", event),
            Ok(None) => {}
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }

    async fn next_event(&mut self) -> Option<ServerEvent> {
        while let Some(frame) = self.stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    return Some(
                        serde_json::from_str(&text).expect("Failed to decode server event"),
                    );
                }
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => {}
            }
        }
        None
    }
}
