//! Request handlers.

mod error;
mod http;
mod sse;
mod websocket;

pub use http::{create_room, get_room, get_room_info, health_check, send_message, typing};
pub use sse::sse_handler;
pub use websocket::websocket_handler;

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, RoomId},
    usecase::RelayError,
};

/// Room id taken from a URL; anything malformed cannot name an existing room.
fn room_id_from_path(room_id: String) -> Result<RoomId, RelayError> {
    RoomId::new(room_id.clone()).map_err(|_| RelayError::RoomNotFound(room_id))
}

/// Client-chosen connection id, or a fresh one.
fn connection_id_or_generate(user_id: Option<String>) -> Result<ConnectionId, RelayError> {
    match user_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => Ok(ConnectionId::new(id)?),
        None => Ok(ConnectionIdFactory::generate()),
    }
}

/// Connection id required by a send/typing request.
fn required_connection_id(user_id: Option<String>) -> Result<ConnectionId, RelayError> {
    match user_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => Ok(ConnectionId::new(id)?),
        None => Err(RelayError::InvalidInput("userId is required".to_string())),
    }
}
