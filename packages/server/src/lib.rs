//! Anonymous room-based chat relay.
//!
//! Clients create ephemeral rooms, share a link, and exchange messages,
//! typing indicators and delivery status through the server, over a
//! WebSocket or a server-sent events stream.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
