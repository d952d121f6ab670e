//! UseCase layer: one struct per client operation.
//!
//! Room membership changes and the broadcasts they trigger are serialized per
//! room through [`PresenceTracker::lock_room`].

pub mod config;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_room_detail;
pub mod get_room_list;
pub mod history;
pub mod join_room;
pub mod presence;
pub mod room_registry;
pub mod send_message;

#[cfg(test)]
mod test_support;

pub use config::ChatConfig;
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{GetRoomDetailError, JoinError, PresenceError, SendMessageError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_room_list::GetRoomListUseCase;
pub use history::RecentHistory;
pub use join_room::JoinRoomUseCase;
pub use presence::{PresenceTracker, RoomLock};
pub use room_registry::RoomRegistry;
pub use send_message::SendMessageUseCase;
