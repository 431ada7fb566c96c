//! BuzzChat realtime server binary.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin buzzchat-server
//! ```

use std::time::Duration;

use clap::Parser;

use buzzchat_server::config::{MessageRouting, RouterConfig, ServerConfig};
use buzzchat_server::logger::setup_logger;

#[derive(Debug, Parser)]
#[command(name = "buzzchat-server", about = "BuzzChat realtime server")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Route `new message` fan-out into the chat room instead of each
    /// recipient's personal room
    #[arg(long)]
    route_to_chat_room: bool,

    /// Expire typing indicators server-side after this many seconds of
    /// silence (disabled when omitted)
    #[arg(long)]
    typing_sweep_secs: Option<u64>,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        router: RouterConfig {
            message_routing: if args.route_to_chat_room {
                MessageRouting::ChatRoom
            } else {
                MessageRouting::PersonalRooms
            },
            typing_sweep_ttl: args.typing_sweep_secs.map(Duration::from_secs),
        },
    };

    if let Err(e) = buzzchat_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
