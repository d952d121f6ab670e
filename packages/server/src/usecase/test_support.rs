//! Shared fixture for UseCase tests.

use std::sync::Arc;

use parlor_shared::time::FixedClock;
use tokio::sync::mpsc;

use crate::{
    domain::{ChatStore, ConnectionId, MessagePusher, Room, RoomId},
    infrastructure::{
        dto::websocket::ServerEvent, message_pusher::WebSocketMessagePusher,
        repository::InMemoryChatStore,
    },
};

use super::{
    config::ChatConfig, history::RecentHistory, presence::PresenceTracker,
    room_registry::RoomRegistry,
};

/// Fixed "now" used by every UseCase test (2023-01-01T00:00:00Z)
pub const NOW: i64 = 1_672_531_200_000;

pub struct Fixture {
    pub store: Arc<dyn ChatStore>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub registry: Arc<RoomRegistry>,
    pub presence: Arc<PresenceTracker>,
    pub history: Arc<RecentHistory>,
    pub clock: Arc<FixedClock>,
}

impl Fixture {
    /// Rooms: r1 "General", r2 "Random"
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryChatStore::with_rooms([
            Room::new(room_id("r1"), "General"),
            Room::new(room_id("r2"), "Random"),
        ])))
    }

    pub fn with_store(store: Arc<dyn ChatStore>) -> Self {
        let clock = Arc::new(FixedClock::new(NOW));
        Self {
            pusher: Arc::new(WebSocketMessagePusher::new()),
            registry: Arc::new(RoomRegistry::new(store.clone())),
            presence: Arc::new(PresenceTracker::new(store.clone())),
            history: Arc::new(RecentHistory::new(
                store.clone(),
                clock.clone(),
                &ChatConfig::default(),
            )),
            clock,
            store,
        }
    }

    /// Register a connection with the pusher and return its receiving end.
    pub async fn connect(&self, id: &str) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = connection(id);
        self.pusher.register_client(connection_id.clone(), tx).await;
        (connection_id, rx)
    }
}

pub fn room_id(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}

pub fn connection(id: &str) -> ConnectionId {
    ConnectionId::new(id.to_string()).unwrap()
}

/// Every frame queued so far, decoded.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        events.push(serde_json::from_str(&frame).unwrap());
    }
    events
}
