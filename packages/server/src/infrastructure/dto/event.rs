//! Push-channel event DTOs.
//!
//! Every payload is a JSON object discriminated by a kebab-case `type`.

use serde::{Deserialize, Serialize};

use crate::domain::{MessageKind, MessageStatus};

/// Chat message as seen by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub text: String,
    pub username: String,
    /// Sender's connection id; absent for the host's initial message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// RFC 3339, server receipt time.
    pub timestamp: String,
    pub kind: MessageKind,
    pub status: MessageStatus,
}

/// Events pushed from the relay to a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    Connected { user_id: String, message: String },
    #[serde(rename_all = "camelCase")]
    RoomJoined {
        room_id: String,
        room_name: String,
        participant_count: usize,
        is_host: bool,
        messages: Vec<MessageDto>,
    },
    #[serde(rename_all = "camelCase")]
    UserJoined {
        username: String,
        participant_count: usize,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    UserLeft {
        username: String,
        participant_count: usize,
        message: String,
    },
    NewMessage(MessageDto),
    #[serde(rename_all = "camelCase")]
    MessageStatusUpdate {
        message_id: String,
        status: MessageStatus,
    },
    UserTyping { username: String, typing: bool },
    Error { message: String },
}

/// Actions a participant sends over a bidirectional socket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientAction {
    #[serde(rename_all = "camelCase")]
    SendMessage {
        message: String,
        #[serde(default)]
        message_id: Option<String>,
    },
    Typing { typing: bool },
    TypingStart,
    TypingStop,
    Leave,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_serializes_flat_with_type_tag() {
        // テスト項目: new-message はメッセージのフィールドと type が同じ階層に並ぶ
        // given (前提条件):
        let event = ServerEvent::NewMessage(MessageDto {
            id: "m1".to_string(),
            text: "hello".to_string(),
            username: "alice".to_string(),
            user_id: None,
            timestamp: "2023-01-01T00:00:00.000Z".to_string(),
            kind: MessageKind::Text,
            status: MessageStatus::Sent,
        });

        // when (操作):
        let json = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "new-message");
        assert_eq!(json["id"], "m1");
        assert_eq!(json["kind"], "text");
        assert_eq!(json["status"], "sent");
        assert!(json.get("userId").is_none());
    }

    #[test]
    fn test_status_update_uses_camel_case_fields() {
        // テスト項目: message-status-update のフィールドは camelCase
        // given (前提条件):
        let event = ServerEvent::MessageStatusUpdate {
            message_id: "m1".to_string(),
            status: MessageStatus::Delivered,
        };

        // when (操作):
        let json = serde_json::to_string(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            r#"{"type":"message-status-update","messageId":"m1","status":"delivered"}"#
        );
    }

    #[test]
    fn test_client_action_parsing() {
        // テスト項目: クライアントからのアクションが type で判別される
        // when (操作):
        let send: ClientAction =
            serde_json::from_str(r#"{"type":"send-message","message":"hi","messageId":"c-1"}"#)
                .unwrap();
        let send_without_id: ClientAction =
            serde_json::from_str(r#"{"type":"send-message","message":"hi"}"#).unwrap();
        let typing: ClientAction =
            serde_json::from_str(r#"{"type":"typing","typing":true}"#).unwrap();
        let stop: ClientAction = serde_json::from_str(r#"{"type":"typing-stop"}"#).unwrap();
        let unknown = serde_json::from_str::<ClientAction>(r#"{"type":"explode"}"#);

        // then (期待する結果):
        assert_eq!(
            send,
            ClientAction::SendMessage {
                message: "hi".to_string(),
                message_id: Some("c-1".to_string())
            }
        );
        assert_eq!(
            send_without_id,
            ClientAction::SendMessage {
                message: "hi".to_string(),
                message_id: None
            }
        );
        assert_eq!(typing, ClientAction::Typing { typing: true });
        assert_eq!(stop, ClientAction::TypingStop);
        assert!(unknown.is_err());
    }
}
