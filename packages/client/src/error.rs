//! Client adapter error definitions.

use thiserror::Error;

/// Errors surfaced by the realtime client adapter.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The session already owns a live connection
    #[error("a realtime connection already exists for this session")]
    AlreadyConnected,

    /// An emit was attempted without a live connection
    #[error("no realtime connection is active")]
    NotConnected,

    /// Transport-level failure
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Wire encoding failure
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
