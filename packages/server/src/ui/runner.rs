//! Server assembly and run loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::ui::handler::{http, websocket};
use crate::ui::signal::shutdown_signal;
use crate::ui::state::{AppState, dispatch};

/// Build the axum application around shared state. Exposed separately so
/// integration tests can boot the exact routing the binary uses.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket::websocket_handler))
        .route("/api/health", get(http::health_check))
        .route("/api/presence", get(http::get_presence))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Spawn the periodic typing sweep when a TTL is configured.
pub fn spawn_typing_sweep(state: Arc<AppState>, ttl: Duration) {
    // Sweep at half the TTL so staleness is bounded by ~1.5x the TTL.
    let period = (ttl / 2).max(Duration::from_millis(250));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let deliveries = state.router.lock().await.sweep_typing(Instant::now());
            dispatch(&state, deliveries).await;
        }
    });
}

/// Bind and serve until a shutdown signal arrives.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new(config.router));
    let app = build_app(state.clone());

    if let Some(ttl) = config.router.typing_sweep_ttl {
        tracing::info!("server-side typing sweep enabled, ttl {:?}", ttl);
        spawn_typing_sweep(state, ttl);
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
