//! Domain entities.

use super::value_object::{ConnectionId, MessageContent, RoomId, Timestamp, Username};

/// A named channel that partitions users and messages.
///
/// Rooms are created outside the relay and never renamed or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
}

impl Room {
    pub fn new(id: RoomId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Binding of one live connection to a room under a chosen username
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub connection_id: ConnectionId,
    pub room_id: RoomId,
    pub username: Username,
}

impl UserSession {
    pub fn new(connection_id: ConnectionId, room_id: RoomId, username: Username) -> Self {
        Self {
            connection_id,
            room_id,
            username,
        }
    }
}

/// A chat message sent to a room. Append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub content: MessageContent,
    pub timestamp: Timestamp,
    pub username: Username,
    pub room_id: RoomId,
}

impl ChatMessage {
    pub fn new(
        content: MessageContent,
        timestamp: Timestamp,
        username: Username,
        room_id: RoomId,
    ) -> Self {
        Self {
            content,
            timestamp,
            username,
            room_id,
        }
    }
}

/// Room state as seen by a client: occupants plus recent history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room: Room,
    /// Occupants sorted by username, then connection id
    pub users: Vec<UserSession>,
    /// Recent history in ascending timestamp order
    pub messages: Vec<ChatMessage>,
}

/// Sort occupants by username, breaking ties by connection id.
pub fn sort_occupants(users: &mut [UserSession]) {
    users.sort_by(|a, b| {
        a.username
            .cmp(&b.username)
            .then_with(|| a.connection_id.cmp(&b.connection_id))
    });
}
