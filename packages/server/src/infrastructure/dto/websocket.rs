//! WebSocket event frames.
//!
//! Every frame is a JSON object tagged by its `event` field. Unary requests
//! carry an `ackId` which the server echoes back in an `ack` frame.

use serde::{Deserialize, Serialize};

/// Chat message payload (inbound `sendChatMessage`, outbound `chatMessage`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub content: String,
    pub timestamp: i64,
    pub username: String,
    pub room_id: String,
}

/// Payload of `userJoinRequest`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestDto {
    pub username: String,
    pub room_id: String,
}

/// Client → server events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    GetRoomList {
        #[serde(rename = "ackId")]
        ack_id: u64,
    },
    UserJoinRequest {
        #[serde(rename = "ackId")]
        ack_id: u64,
        data: JoinRequestDto,
    },
    SendChatMessage {
        data: ChatMessageDto,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUserDto {
    pub connection_id: String,
    pub username: String,
}

/// Room state delivered to a client that joined successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshotDto {
    pub id: String,
    pub name: String,
    pub users: Vec<OnlineUserDto>,
    pub messages: Vec<ChatMessageDto>,
}

/// Reply to `userJoinRequest`. `room` is serialized as `null` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponseDto {
    pub success: bool,
    pub room: Option<RoomSnapshotDto>,
}

/// Payload of `userJoined` / `userLeft`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceNoticeDto {
    pub username: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AckPayload {
    RoomList(Vec<RoomSummaryDto>),
    Join(JoinResponseDto),
}

/// Server → client events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ServerEvent {
    Hello,
    Ack {
        #[serde(rename = "ackId")]
        ack_id: u64,
        data: AckPayload,
    },
    ChatMessage {
        data: ChatMessageDto,
    },
    UserJoined {
        data: PresenceNoticeDto,
    },
    UserLeft {
        data: PresenceNoticeDto,
    },
    OnlineUsers {
        data: Vec<OnlineUserDto>,
    },
}
