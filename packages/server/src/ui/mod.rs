//! Transport layer: axum HTTP/WebSocket wiring around the event router.

pub mod handler;
pub mod runner;
mod signal;
pub mod state;

pub use state::AppState;
