//! BuzzChat client realtime adapter.
//!
//! Owns exactly one WebSocket connection per authenticated session and keeps
//! the reactive chat state (message list, typing set, online set) in sync
//! with server pushes. REST calls stay with the caller: after a successful
//! send, the caller shapes the populated message payload and announces it
//! through [`RealtimeClient::announce_message`].

pub mod error;
pub mod session;
pub mod store;
pub mod typing;

pub use error::ClientError;
pub use session::{ClientConfig, RealtimeClient};
pub use store::{ChatStore, StoreChange};
pub use typing::{TypingDebounce, TypingSet};
