//! Outbound events relayed to participants.

use super::{
    entity::{ChatMessage, MessageStatus},
    value_object::{ConnectionId, MessageId, RoomId, RoomName, Username},
};

/// The closed set of events a participant can receive.
///
/// Encoding to the wire format happens once, in the pusher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// Push channel is open.
    Connected { connection_id: ConnectionId },
    /// Private acknowledgment of a join, with the recent backlog.
    RoomJoined {
        room_id: RoomId,
        room_name: RoomName,
        participant_count: usize,
        is_host: bool,
        messages: Vec<ChatMessage>,
    },
    UserJoined {
        username: Username,
        participant_count: usize,
    },
    UserLeft {
        username: Username,
        participant_count: usize,
    },
    NewMessage(ChatMessage),
    MessageStatusUpdate {
        message_id: MessageId,
        status: MessageStatus,
    },
    UserTyping { username: Username, typing: bool },
    /// A request from this participant failed.
    Error { message: String },
}

impl RoomEvent {
    /// Event name as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::RoomJoined { .. } => "room-joined",
            Self::UserJoined { .. } => "user-joined",
            Self::UserLeft { .. } => "user-left",
            Self::NewMessage(_) => "new-message",
            Self::MessageStatusUpdate { .. } => "message-status-update",
            Self::UserTyping { .. } => "user-typing",
            Self::Error { .. } => "error",
        }
    }
}
