//! Conversion logic between DTOs and domain entities.

use parlor_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ChatMessage, MessageContent, Notification, Room, RoomId, RoomSnapshot, Timestamp, UserSession,
    Username, ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<dto::ChatMessageDto> for ChatMessage {
    type Error = ValueObjectError;

    fn try_from(dto: dto::ChatMessageDto) -> Result<Self, Self::Error> {
        Ok(Self {
            content: MessageContent::new(dto.content)?,
            timestamp: Timestamp::new(dto.timestamp),
            username: Username::new(dto.username)?,
            room_id: RoomId::new(dto.room_id)?,
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&Room> for dto::RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            name: room.name.clone(),
        }
    }
}

impl From<&UserSession> for dto::OnlineUserDto {
    fn from(user: &UserSession) -> Self {
        Self {
            connection_id: user.connection_id.as_str().to_string(),
            username: user.username.as_str().to_string(),
        }
    }
}

impl From<&ChatMessage> for dto::ChatMessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            content: message.content.as_str().to_string(),
            timestamp: message.timestamp.value(),
            username: message.username.as_str().to_string(),
            room_id: message.room_id.as_str().to_string(),
        }
    }
}

impl From<&RoomSnapshot> for dto::RoomSnapshotDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            id: snapshot.room.id.as_str().to_string(),
            name: snapshot.room.name.clone(),
            users: snapshot.users.iter().map(Into::into).collect(),
            messages: snapshot.messages.iter().map(Into::into).collect(),
        }
    }
}

impl From<&ChatMessage> for http::MessageRecordDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            content: message.content.as_str().to_string(),
            timestamp: message.timestamp.value(),
            username: message.username.as_str().to_string(),
            sent_at: timestamp_to_rfc3339(message.timestamp.value()),
        }
    }
}

impl From<&Notification> for dto::ServerEvent {
    fn from(notification: &Notification) -> Self {
        match notification {
            Notification::Hello => dto::ServerEvent::Hello,
            Notification::RoomList { request_id, rooms } => dto::ServerEvent::Ack {
                ack_id: request_id.value(),
                data: dto::AckPayload::RoomList(rooms.iter().map(Into::into).collect()),
            },
            Notification::JoinResult {
                request_id,
                snapshot,
            } => dto::ServerEvent::Ack {
                ack_id: request_id.value(),
                data: dto::AckPayload::Join(dto::JoinResponseDto {
                    success: snapshot.is_some(),
                    room: snapshot.as_ref().map(Into::into),
                }),
            },
            Notification::ChatMessage(message) => dto::ServerEvent::ChatMessage {
                data: message.into(),
            },
            Notification::UserJoined {
                username,
                timestamp,
            } => dto::ServerEvent::UserJoined {
                data: dto::PresenceNoticeDto {
                    username: username.as_str().to_string(),
                    timestamp: timestamp.value(),
                },
            },
            Notification::UserLeft {
                username,
                timestamp,
            } => dto::ServerEvent::UserLeft {
                data: dto::PresenceNoticeDto {
                    username: username.as_str().to_string(),
                    timestamp: timestamp.value(),
                },
            },
            Notification::OnlineUsers(users) => dto::ServerEvent::OnlineUsers {
                data: users.iter().map(Into::into).collect(),
            },
        }
    }
}
