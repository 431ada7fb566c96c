//! BuzzChat realtime server library.
//!
//! Bridges persisted chat state with live WebSocket delivery: maps users to
//! connections (presence), connections to broadcast groups (rooms), and fans
//! inbound events out to the right set of peers. Message, chat and auth
//! persistence live behind the REST collaborators and are not part of this
//! crate.

pub mod config;
pub mod domain;
pub mod error;
pub mod logger;
pub mod realtime;
pub mod ui;

pub use config::{MessageRouting, RouterConfig, ServerConfig};
pub use error::ServerError;
pub use ui::runner::run_server;
