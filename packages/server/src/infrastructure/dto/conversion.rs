//! Conversion logic between DTOs and domain entities.

use bisik_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, Room, RoomEvent};
use crate::infrastructure::dto::{
    event::{MessageDto, ServerEvent},
    http::RoomInfoDto,
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&ChatMessage> for MessageDto {
    fn from(model: &ChatMessage) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            text: model.text.as_str().to_string(),
            username: model.username.as_str().to_string(),
            user_id: model.sender.as_ref().map(|id| id.as_str().to_string()),
            timestamp: timestamp_to_rfc3339(model.timestamp.value()),
            kind: model.kind,
            status: model.status,
        }
    }
}

impl From<&Room> for RoomInfoDto {
    fn from(model: &Room) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            name: model.name.as_str().to_string(),
            participant_count: model.participant_count(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<&RoomEvent> for ServerEvent {
    fn from(event: &RoomEvent) -> Self {
        match event {
            RoomEvent::Connected { connection_id } => Self::Connected {
                user_id: connection_id.as_str().to_string(),
                message: "Connected to room".to_string(),
            },
            RoomEvent::RoomJoined {
                room_id,
                room_name,
                participant_count,
                is_host,
                messages,
            } => Self::RoomJoined {
                room_id: room_id.as_str().to_string(),
                room_name: room_name.as_str().to_string(),
                participant_count: *participant_count,
                is_host: *is_host,
                messages: messages.iter().map(MessageDto::from).collect(),
            },
            RoomEvent::UserJoined {
                username,
                participant_count,
            } => Self::UserJoined {
                username: username.as_str().to_string(),
                participant_count: *participant_count,
                message: format!("{} joined the chat", username),
            },
            RoomEvent::UserLeft {
                username,
                participant_count,
            } => Self::UserLeft {
                username: username.as_str().to_string(),
                participant_count: *participant_count,
                message: format!("{} left the chat", username),
            },
            RoomEvent::NewMessage(message) => Self::NewMessage(message.into()),
            RoomEvent::MessageStatusUpdate { message_id, status } => Self::MessageStatusUpdate {
                message_id: message_id.as_str().to_string(),
                status: *status,
            },
            RoomEvent::UserTyping { username, typing } => Self::UserTyping {
                username: username.as_str().to_string(),
                typing: *typing,
            },
            RoomEvent::Error { message } => Self::Error {
                message: message.clone(),
            },
        }
    }
}

/// Encode a domain event into its JSON wire form.
pub fn encode_event(event: &RoomEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ServerEvent::from(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ConnectionId, MessageId, MessageStatus, MessageText, RoomIdFactory, RoomName, Timestamp,
        Username,
    };

    #[test]
    fn test_domain_chat_message_to_dto() {
        // テスト項目: ドメインエンティティの ChatMessage が DTO に変換される
        // given (前提条件):
        let message = ChatMessage::new(
            MessageId::new("m1".to_string()).unwrap(),
            MessageText::new("Halo!".to_string()).unwrap(),
            ConnectionId::new("user_1".to_string()).unwrap(),
            Username::new("budi".to_string()).unwrap(),
            Timestamp::new(1672531200000),
        );

        // when (操作):
        let dto = MessageDto::from(&message);

        // then (期待する結果):
        assert_eq!(dto.id, "m1");
        assert_eq!(dto.text, "Halo!");
        assert_eq!(dto.username, "budi");
        assert_eq!(dto.user_id.as_deref(), Some("user_1"));
        assert_eq!(dto.timestamp, "2023-01-01T00:00:00.000Z");
        assert_eq!(dto.status, MessageStatus::Sent);
    }

    #[test]
    fn test_host_message_has_no_user_id() {
        // テスト項目: ホストの初期メッセージは userId を持たず、username は Host
        // given (前提条件):
        let message = ChatMessage::from_host(
            MessageId::new("m1".to_string()).unwrap(),
            MessageText::new("hi".to_string()).unwrap(),
            Timestamp::new(0),
        );

        // when (操作):
        let dto = MessageDto::from(&message);

        // then (期待する結果):
        assert_eq!(dto.user_id, None);
        assert_eq!(dto.username, "Host");
    }

    #[test]
    fn test_room_to_info_dto() {
        // テスト項目: Room が公開用のサマリーに変換される
        // given (前提条件):
        let room = Room::new(
            RoomIdFactory::generate(),
            RoomName::default(),
            Timestamp::new(1672531200000),
            None,
        );

        // when (操作):
        let dto = RoomInfoDto::from(&room);

        // then (期待する結果):
        assert_eq!(dto.id, room.id.as_str());
        assert_eq!(dto.name, "Chat Rahasia");
        assert_eq!(dto.participant_count, 0);
        assert_eq!(dto.created_at, "2023-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_encode_user_joined_event() {
        // テスト項目: user-joined イベントに人が読めるメッセージが付与される
        // given (前提条件):
        let event = RoomEvent::UserJoined {
            username: Username::new("budi".to_string()).unwrap(),
            participant_count: 2,
        };

        // when (操作):
        let json: serde_json::Value = serde_json::from_str(&encode_event(&event).unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "user-joined");
        assert_eq!(json["participantCount"], 2);
        assert_eq!(json["message"], "budi joined the chat");
    }
}
