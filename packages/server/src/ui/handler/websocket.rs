//! WebSocket connection handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use buzzchat_shared::ClientEvent;

use crate::domain::ConnectionId;
use crate::ui::state::{AppState, dispatch};

/// Upgrade handler for `GET /ws`. Connections carry no identity at upgrade
/// time; a connection stays Anonymous until its `setup` event.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = ConnectionId::new();

    // Channel other handlers use to push events to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.connections.lock().await.insert(conn_id, tx);
    state.router.lock().await.register(conn_id);
    tracing::info!(connection = %conn_id, "socket connected");

    let (mut sender, mut receiver) = socket.split();

    // Drain the outbound channel into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Feed inbound frames through the router
    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!(connection = %conn_id, "WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        let deliveries = recv_state
                            .router
                            .lock()
                            .await
                            .handle(conn_id, event, Instant::now());
                        dispatch(&recv_state, deliveries).await;
                    }
                    Err(e) => {
                        // Malformed events are dropped, never surfaced back.
                        tracing::warn!(connection = %conn_id, "Dropping malformed event: {}", e);
                    }
                },
                Message::Close(_) => {
                    tracing::info!(connection = %conn_id, "client requested close");
                    break;
                }
                // Ping/pong is handled by the protocol layer
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let deliveries = state.router.lock().await.disconnect(conn_id);
    state.connections.lock().await.remove(&conn_id);
    dispatch(&state, deliveries).await;
    tracing::info!(connection = %conn_id, "socket closed");
}
