//! CLI smoke client for the BuzzChat realtime server.
//!
//! Connects one realtime session, joins a chat and lets you exchange
//! messages and typing indicators with other instances. Messages are
//! announced directly over the realtime channel with locally minted ids;
//! the real application persists through the REST path first. Submit an
//! empty line to signal typing to your peers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin buzzchat-client -- --user alice --chat c1 --peers bob
//! ```

use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::{Mutex, mpsc};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use buzzchat_client::{ChatStore, ClientConfig, RealtimeClient, StoreChange, TypingDebounce};
use buzzchat_shared::{ChatSummary, MessagePayload, UserSummary};

#[derive(Debug, Parser)]
#[command(name = "buzzchat-client", about = "BuzzChat realtime CLI client")]
struct Args {
    /// WebSocket endpoint of the realtime server
    #[arg(long, default_value = "ws://127.0.0.1:5000/ws")]
    server: String,

    /// User id to identify as
    #[arg(long)]
    user: String,

    /// Chat id to join
    #[arg(long)]
    chat: String,

    /// Comma-separated peer user ids in the chat
    #[arg(long, value_delimiter = ',')]
    peers: Vec<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("client error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let store = Arc::new(Mutex::new(ChatStore::new(
        args.user.clone(),
        Duration::from_secs(3),
    )));
    let client = RealtimeClient::new(ClientConfig::new(args.server.clone()), store.clone());

    client.connect(&args.user).await?;
    client.join_chat(&args.chat).await?;
    println!("connected as '{}' in chat '{}'", args.user, args.chat);

    // Print store mutations as they happen
    let mut changes = store.lock().await.subscribe();
    let printer_store = store.clone();
    tokio::spawn(async move {
        while let Ok(change) = changes.recv().await {
            match change {
                StoreChange::MessageAdded(id) => {
                    let store = printer_store.lock().await;
                    if let Some(message) = store.messages().iter().find(|m| m.id == id) {
                        println!("<{}> {}", message.sender.name, message.content);
                    }
                }
                StoreChange::TypingStarted(user) => println!("-- {} is typing...", user),
                StoreChange::TypingStopped(user) => println!("-- {} stopped typing", user),
                StoreChange::UserOnline(user) => println!("-- {} is online", user),
                StoreChange::UserOffline(user) => println!("-- {} went offline", user),
                StoreChange::MessageRead(id) => println!("-- message {} read", id),
            }
        }
    });

    // rustyline is blocking; feed lines through a channel from its own thread
    let (lines_tx, mut lines_rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                eprintln!("failed to start line editor: {}", e);
                return;
            }
        };
        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if lines_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("read error: {}", e);
                    break;
                }
            }
        }
    });

    // Line input is the closest thing to keystrokes we get here, so each
    // submitted line counts as one burst of typing activity.
    let mut debounce = TypingDebounce::new(Duration::from_secs(3));
    let mut debounce_poll = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            line = lines_rx.recv() => {
                let Some(line) = line else { break };
                let content = line.trim();
                if content.is_empty() {
                    if debounce.keystroke(Instant::now()) {
                        client.typing(&args.chat).await?;
                    }
                    continue;
                }
                if content == "/quit" {
                    break;
                }

                let message = build_message(&args, content);
                store.lock().await.add_message(message.clone());
                client.announce_message(message).await?;
                if debounce.cancel() {
                    client.stop_typing(&args.chat).await?;
                }
            }
            _ = debounce_poll.tick() => {
                if debounce.poll(Instant::now()) {
                    client.stop_typing(&args.chat).await?;
                }
            }
        }
    }

    client.disconnect().await;
    Ok(())
}

fn build_message(args: &Args, content: &str) -> MessagePayload {
    let mut users = vec![UserSummary::new(args.user.clone(), args.user.clone())];
    users.extend(
        args.peers
            .iter()
            .map(|peer| UserSummary::new(peer.clone(), peer.clone())),
    );
    MessagePayload {
        id: Uuid::new_v4().to_string(),
        content: content.to_string(),
        file_url: None,
        created_at: chrono::Utc::now(),
        sender: UserSummary::new(args.user.clone(), args.user.clone()),
        chat: ChatSummary {
            id: args.chat.clone(),
            users,
        },
    }
}
