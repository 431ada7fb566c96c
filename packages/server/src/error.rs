//! Server startup error definitions.

use thiserror::Error;

/// Errors that can abort server startup or the accept loop.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or serving the listener failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
