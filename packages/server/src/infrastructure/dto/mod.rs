//! Data Transfer Objects (DTOs) for the chat relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event frames
//! - `http`: HTTP API response bodies

pub mod conversion;
pub mod http;
pub mod websocket;
