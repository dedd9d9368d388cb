//! UseCase errors.
//!
//! Every failure is scoped to the single request that caused it.

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Room id absent, or the room was reaped.
    #[error("Room not found or expired")]
    RoomNotFound(String),
    /// The connection never joined this room (or already left).
    #[error("Not joined to this room")]
    NotJoined(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Connection '{0}' already joined this room")]
    AlreadyJoined(String),
}

impl From<RepositoryError> for RelayError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::RoomNotFound(id) => Self::RoomNotFound(id),
            RepositoryError::ParticipantNotFound(id) => Self::NotJoined(id),
            RepositoryError::ParticipantAlreadyJoined(id) => Self::AlreadyJoined(id),
        }
    }
}

impl From<ValueObjectError> for RelayError {
    fn from(err: ValueObjectError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
