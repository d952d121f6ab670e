//! Room-based WebSocket chat relay library.
//!
//! This library provides the connection, presence and room-membership core of
//! the Parlor chat relay, together with the WebSocket/HTTP surface around it.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
