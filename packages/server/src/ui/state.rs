//! Shared application state and delivery dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::config::RouterConfig;
use crate::domain::ConnectionId;
use crate::realtime::{Delivery, EventRouter};

/// Shared application state.
///
/// The router holds all realtime bookkeeping; the connections map holds the
/// outbound channel of every live socket. They are locked independently and
/// always in router-then-connections order.
pub struct AppState {
    pub router: Mutex<EventRouter>,
    pub connections: Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<String>>>,
}

impl AppState {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            router: Mutex::new(EventRouter::new(config)),
            connections: Mutex::new(HashMap::new()),
        }
    }
}

/// Push each delivery onto its target connection's outbound channel.
///
/// Fire-and-forget: a closed or unknown target is logged and skipped, never
/// an error. Undeliverable events are simply dropped; clients recover state
/// through the REST history fetch.
pub async fn dispatch(state: &Arc<AppState>, deliveries: Vec<Delivery>) {
    if deliveries.is_empty() {
        return;
    }
    let connections = state.connections.lock().await;
    for delivery in deliveries {
        let json = match serde_json::to_string(&delivery.event) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to encode outbound event: {}", e);
                continue;
            }
        };
        match connections.get(&delivery.to) {
            Some(sender) => {
                if sender.send(json).is_err() {
                    tracing::warn!(connection = %delivery.to, "outbound channel closed, dropping event");
                }
            }
            None => {
                tracing::debug!(connection = %delivery.to, "target connection gone, dropping event");
            }
        }
    }
}
