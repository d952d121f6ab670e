//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

pub use super::websocket::{OnlineUserDto, RoomSummaryDto};

/// Stored message as exposed by the HTTP API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecordDto {
    pub content: String,
    pub timestamp: i64,
    pub username: String,
    /// RFC 3339 rendering of `timestamp`
    pub sent_at: Option<String>,
}

/// `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub name: String,
    pub users: Vec<OnlineUserDto>,
    pub messages: Vec<MessageRecordDto>,
}

/// Body of every 404 response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFoundDto {
    pub message: String,
}
