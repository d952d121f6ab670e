//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{alive, get_room_detail, get_rooms, health_check, not_found};
pub use websocket::websocket_handler;
