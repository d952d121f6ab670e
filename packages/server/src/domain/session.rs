//! Per-connection lifecycle state machine.
//!
//! ```text
//! Connected ──begin_join──▶ Joining ──complete_join──▶ Joined(room)
//!     ▲                        │
//!     └───────abort_join───────┘
//!
//! any state ──disconnect──▶ Disconnected (terminal)
//! ```

use super::{error::SessionStateError, value_object::RoomId};

/// Lifecycle state of one connection session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Transport open, no room
    #[default]
    Connected,
    /// Join request in flight
    Joining,
    /// Room assigned
    Joined(RoomId),
    /// Transport closed
    Disconnected,
}

impl ConnectionState {
    fn name(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "connected",
            ConnectionState::Joining => "joining",
            ConnectionState::Joined(_) => "joined",
            ConnectionState::Disconnected => "disconnected",
        }
    }

    fn invalid(&self, action: &'static str) -> SessionStateError {
        SessionStateError::InvalidTransition {
            action,
            state: self.name(),
        }
    }

    /// Room the connection is currently joined to, if any
    pub fn current_room(&self) -> Option<&RoomId> {
        match self {
            ConnectionState::Joined(room_id) => Some(room_id),
            _ => None,
        }
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(self, ConnectionState::Disconnected)
    }

    /// `Connected → Joining`.
    ///
    /// A join request from a connection that already joined is still let
    /// through (the state is kept) so the presence tracker can report it as
    /// a duplicate session.
    pub fn begin_join(&mut self) -> Result<(), SessionStateError> {
        match self {
            ConnectionState::Connected => {
                *self = ConnectionState::Joining;
                Ok(())
            }
            ConnectionState::Joined(_) => Ok(()),
            _ => Err(self.invalid("begin join")),
        }
    }

    /// `Joining → Joined(room)`
    pub fn complete_join(&mut self, room_id: RoomId) -> Result<(), SessionStateError> {
        match self {
            ConnectionState::Joining => {
                *self = ConnectionState::Joined(room_id);
                Ok(())
            }
            _ => Err(self.invalid("complete join")),
        }
    }

    /// `Joining → Connected`; a rejected join leaves an already joined session untouched.
    pub fn abort_join(&mut self) -> Result<(), SessionStateError> {
        match self {
            ConnectionState::Joining => {
                *self = ConnectionState::Connected;
                Ok(())
            }
            ConnectionState::Joined(_) => Ok(()),
            _ => Err(self.invalid("abort join")),
        }
    }

    /// Any state `→ Disconnected`. Returns `false` if it was already disconnected.
    pub fn disconnect(&mut self) -> bool {
        if self.is_disconnected() {
            return false;
        }
        *self = ConnectionState::Disconnected;
        true
    }
}
