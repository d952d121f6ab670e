//! Domain layer for the chat relay.
//!
//! This module contains business types and the interfaces the domain needs
//! (store, message pusher), independent of DTOs and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod session;
pub mod value_object;

pub use entity::{ChatMessage, Room, RoomSnapshot, UserSession, sort_occupants};
pub use error::{MessagePushError, SessionStateError, StoreError, ValueObjectError};
pub use message_pusher::{MessagePusher, Notification, PusherChannel};
pub use repository::ChatStore;
#[cfg(test)]
pub use repository::MockChatStore;
pub use session::ConnectionState;
pub use value_object::{ConnectionId, MessageContent, RequestId, RoomId, Timestamp, Username};
