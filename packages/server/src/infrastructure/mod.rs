//! Infrastructure layer: concrete store, message pusher and wire DTOs.

pub mod dto;
pub mod message_pusher;
pub mod repository;
