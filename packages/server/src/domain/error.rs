//! Domain errors.

use thiserror::Error;

/// Value Object の生成に失敗したときのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{field} must be at most {max} characters (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    #[error("{0} contains invalid characters")]
    InvalidCharacters(&'static str),
}

/// Room エンティティの不変条件違反
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("participant '{0}' already joined the room")]
    AlreadyJoined(String),
    #[error("participant '{0}' is not in the room")]
    NotJoined(String),
    #[error("room has been closed")]
    Closed,
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),
    #[error("participant '{0}' not found")]
    ParticipantNotFound(String),
    #[error("participant '{0}' already joined")]
    ParticipantAlreadyJoined(String),
}

impl RepositoryError {
    /// Map a room invariant violation for the given room.
    pub fn from_room_error(room_id: &str, err: RoomError) -> Self {
        match err {
            RoomError::AlreadyJoined(id) => Self::ParticipantAlreadyJoined(id),
            RoomError::NotJoined(id) => Self::ParticipantNotFound(id),
            RoomError::Closed => Self::RoomNotFound(room_id.to_string()),
        }
    }
}

/// MessagePusher 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
