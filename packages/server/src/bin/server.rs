//! Room-based WebSocket chat server.
//!
//! Clients join one room under a username, receive its recent history and
//! occupants, and exchange messages with the other members of that room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parlor-server
//! cargo run --bin parlor-server -- --host 0.0.0.0 --port 3000 --room lobby:Lobby
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use parlor_server::{
    domain::{ChatStore, Room, RoomId},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryChatStore},
    ui::Server,
    usecase::{
        ChatConfig, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        GetRoomDetailUseCase, GetRoomListUseCase, JoinRoomUseCase, PresenceTracker,
        RecentHistory, RoomRegistry, SendMessageUseCase,
        config::{DEFAULT_HISTORY_LIMIT, DEFAULT_HISTORY_WINDOW_SECS},
    },
};
use parlor_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "parlor-server")]
#[command(about = "Room-based WebSocket chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Only messages newer than this are delivered as room history
    #[arg(long, default_value_t = DEFAULT_HISTORY_WINDOW_SECS)]
    history_window_secs: u64,

    /// Maximum number of history messages delivered on join
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    history_limit: usize,

    /// Artificial delay before replying to getRoomList
    #[arg(long, default_value_t = 0)]
    room_list_delay_ms: u64,

    /// Room to create at startup, as ID:NAME (repeatable)
    #[arg(
        long = "room",
        value_name = "ID:NAME",
        value_parser = parse_room,
        default_values = ["general:General", "random:Random", "rust:Rust"]
    )]
    rooms: Vec<Room>,
}

fn parse_room(value: &str) -> Result<Room, String> {
    let (id, name) = value
        .split_once(':')
        .ok_or_else(|| format!("expected ID:NAME, got '{}'", value))?;
    if name.is_empty() {
        return Err(format!("room '{}' has an empty name", id));
    }
    let id = RoomId::new(id.to_string()).map_err(|e| e.to_string())?;
    Ok(Room::new(id, name))
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let config = ChatConfig {
        history_window: Duration::from_secs(args.history_window_secs),
        history_limit: args.history_limit,
        room_list_delay: Duration::from_millis(args.room_list_delay_ms),
    };

    // Initialize dependencies in order:
    // 1. Store
    // 2. MessagePusher
    // 3. Room registry, presence tracker, history
    // 4. UseCases
    // 5. Server

    // 1. Create Store (in-memory database)
    for room in &args.rooms {
        tracing::info!("Room '{}' ({}) created!", room.id, room.name);
    }
    let store = Arc::new(InMemoryChatStore::with_rooms(args.rooms));
    // セッションは接続に紐づくため、起動時に前回の残りを削除
    match store.delete_all_user_sessions().await {
        Ok(0) => {}
        Ok(purged) => tracing::info!("Purged {} stale user sessions", purged),
        Err(e) => {
            tracing::error!("Failed to purge user sessions: {}", e);
            std::process::exit(1);
        }
    }

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let clock = Arc::new(SystemClock);

    // 3. Create room-level services
    let room_registry = Arc::new(RoomRegistry::new(store.clone()));
    let presence = Arc::new(PresenceTracker::new(store.clone()));
    let history = Arc::new(RecentHistory::new(store.clone(), clock.clone(), &config));

    // 4. Create UseCases
    let connect_participant_usecase =
        Arc::new(ConnectParticipantUseCase::new(message_pusher.clone()));
    let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
        store.clone(),
        presence.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let get_room_list_usecase = Arc::new(GetRoomListUseCase::new(
        room_registry.clone(),
        message_pusher.clone(),
        config.room_list_delay,
    ));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        room_registry.clone(),
        presence.clone(),
        history.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        store.clone(),
        presence.clone(),
        message_pusher.clone(),
    ));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(
        room_registry.clone(),
        presence,
        history,
    ));

    // 5. Create and run the server
    let server = Server::new(
        connect_participant_usecase,
        disconnect_participant_usecase,
        get_room_list_usecase,
        join_room_usecase,
        send_message_usecase,
        get_room_detail_usecase,
        room_registry,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
