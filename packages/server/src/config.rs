//! Server and router configuration.

use std::time::Duration;

/// Where `new message` fan-out is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageRouting {
    /// Push into each recipient's personal room (the room a connection joins
    /// at `setup` time). A recipient that never ran `setup` on its current
    /// connection receives nothing, even if it joined the chat room. This is
    /// the historical behavior and the default.
    #[default]
    PersonalRooms,
    /// Broadcast once into the chat room, excluding the sending connection.
    /// Requires recipients to have joined the chat via `join chat`.
    ChatRoom,
}

/// Behavior knobs for the event router.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterConfig {
    pub message_routing: MessageRouting,
    /// When set, the server authoritatively expires typing indicators that
    /// were never followed by `stop typing` (peer crashed or disconnected
    /// uncleanly). When unset, expiry is left to each client's local timer.
    pub typing_sweep_ttl: Option<Duration>,
}

/// Full server configuration, assembled from CLI arguments by the binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub router: RouterConfig,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            router: RouterConfig::default(),
        }
    }
}
