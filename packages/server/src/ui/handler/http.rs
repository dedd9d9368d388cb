//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
};

use crate::{
    infrastructure::dto::http::{
        AckResponse, CreateRoomRequest, CreateRoomResponse, RoomInfoDto, RoomInfoQuery,
        RoomInfoResponse, SendMessageRequest, TypingRequest,
    },
    ui::state::AppState,
    usecase::RelayError,
};

use super::{required_connection_id, room_id_from_path};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a room
///
/// An empty body creates a room with the default name.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CreateRoomResponse>, RelayError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateRoomRequest::default()
    } else {
        serde_json::from_slice::<CreateRoomRequest>(&body)
            .map_err(|e| RelayError::InvalidInput(format!("malformed request body: {}", e)))?
    };

    let created = state
        .create_room_usecase
        .execute(request.room_name, request.initial_message)
        .await?;

    Ok(Json(CreateRoomResponse {
        success: true,
        room_id: created.room_id.into_string(),
        room_url: created.room_url,
        message: "Room created successfully".to_string(),
    }))
}

/// Get room info by path
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomInfoResponse>, RelayError> {
    room_info(&state, &room_id).await
}

/// Get room info by `?roomId=`
pub async fn get_room_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoomInfoQuery>,
) -> Result<Json<RoomInfoResponse>, RelayError> {
    let room_id = query
        .room_id
        .ok_or_else(|| RelayError::InvalidInput("roomId is required".to_string()))?;
    room_info(&state, &room_id).await
}

async fn room_info(state: &AppState, room_id: &str) -> Result<Json<RoomInfoResponse>, RelayError> {
    let room = state.get_room_info_usecase.execute(room_id).await?;
    Ok(Json(RoomInfoResponse {
        success: true,
        room: RoomInfoDto::from(&room),
    }))
}

/// Send a message on behalf of a stream participant
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<AckResponse>, RelayError> {
    let room_id = room_id_from_path(room_id)?;
    let connection_id = required_connection_id(request.user_id)?;
    let text = request
        .message
        .ok_or_else(|| RelayError::InvalidInput("message is required".to_string()))?;

    let message = state
        .send_message_usecase
        .execute(&room_id, &connection_id, text, request.message_id)
        .await?;

    Ok(Json(AckResponse {
        success: true,
        message_id: Some(message.id.into_string()),
    }))
}

/// Relay a typing indicator on behalf of a stream participant
pub async fn typing(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(request): Json<TypingRequest>,
) -> Result<Json<AckResponse>, RelayError> {
    let room_id = room_id_from_path(room_id)?;
    let connection_id = required_connection_id(request.user_id)?;

    state
        .typing_usecase
        .execute(&room_id, &connection_id, request.typing)
        .await?;

    Ok(Json(AckResponse {
        success: true,
        message_id: None,
    }))
}
