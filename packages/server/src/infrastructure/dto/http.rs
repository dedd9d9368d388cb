//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

/// Request body of the create-room endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRoomRequest {
    pub room_name: Option<String>,
    pub initial_message: Option<String>,
}

/// Response of the create-room endpoint
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub success: bool,
    pub room_id: String,
    pub room_url: String,
    pub message: String,
}

/// Public room summary
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfoDto {
    pub id: String,
    pub name: String,
    pub participant_count: usize,
    pub created_at: String,
}

/// Response of the room-info endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct RoomInfoResponse {
    pub success: bool,
    pub room: RoomInfoDto,
}

/// Query of `GET /api/room-info`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfoQuery {
    pub room_id: Option<String>,
}

/// Query of the push-channel endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamQuery {
    pub room_id: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
}

/// Request body of the send endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendMessageRequest {
    pub user_id: Option<String>,
    pub message: Option<String>,
    pub message_id: Option<String>,
}

/// Request body of the typing endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypingRequest {
    pub user_id: Option<String>,
    pub typing: bool,
}

/// Acknowledgment of a send/typing request
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// Error body shared by all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
