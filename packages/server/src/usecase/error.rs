//! UseCase layer errors.

use thiserror::Error;

use crate::domain::StoreError;

/// Presence Tracker errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    /// The connection already has a user session
    #[error("connection '{0}' has already joined a room")]
    DuplicateSession(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Join request errors. All of them are reported to the requester as a failed join.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("connection '{0}' has already joined a room")]
    DuplicateSession(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PresenceError> for JoinError {
    fn from(e: PresenceError) -> Self {
        match e {
            PresenceError::DuplicateSession(id) => JoinError::DuplicateSession(id),
            PresenceError::Store(e) => JoinError::Store(e),
        }
    }
}

/// Chat message relay errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// The sender is not joined to the room the message is addressed to
    #[error("connection '{connection_id}' is not in room '{room_id}'")]
    NotInRoom {
        connection_id: String,
        room_id: String,
    },
}

/// Room detail lookup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
