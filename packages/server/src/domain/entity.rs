//! Entities of the relay domain.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::{
    error::RoomError,
    value_object::{
        ConnectionId, MessageId, MessageText, RoomId, RoomName, Timestamp, Username,
    },
};

/// Number of messages a room retains for backlog replay.
pub const DEFAULT_MESSAGE_RETENTION: usize = 50;

/// Delivery status of a chat message.
///
/// `Sent → Delivered → Read` only ever advances. `Error` is terminal and is
/// set by client-facing layers on transport failure, never by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
    Error,
}

impl MessageStatus {
    fn rank(self) -> Option<u8> {
        match self {
            Self::Sent => Some(0),
            Self::Delivered => Some(1),
            Self::Read => Some(2),
            Self::Error => None,
        }
    }

    /// Whether moving from `self` to `next` is a forward transition.
    pub fn can_advance_to(self, next: MessageStatus) -> bool {
        match (self.rank(), next.rank()) {
            (Some(current), Some(next)) => next > current,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// Kind of a chat message. Only text is relayed today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
}

/// A message appended to a room's log.
///
/// `id`, `text` and `timestamp` never change once appended; only `status` moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: MessageText,
    /// `None` for messages the relay sends on the host's behalf.
    pub sender: Option<ConnectionId>,
    pub username: Username,
    pub timestamp: Timestamp,
    pub kind: MessageKind,
    pub status: MessageStatus,
}

impl ChatMessage {
    pub fn new(
        id: MessageId,
        text: MessageText,
        sender: ConnectionId,
        username: Username,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            text,
            sender: Some(sender),
            username,
            timestamp,
            kind: MessageKind::Text,
            status: MessageStatus::Sent,
        }
    }

    /// The room's initial message, attributed to the host.
    pub fn from_host(id: MessageId, text: MessageText, timestamp: Timestamp) -> Self {
        Self {
            id,
            text,
            sender: None,
            username: Username::host(),
            timestamp,
            kind: MessageKind::Text,
            status: MessageStatus::Sent,
        }
    }
}

/// One joined connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ConnectionId,
    pub username: Username,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(id: ConnectionId, username: Username, joined_at: Timestamp) -> Self {
        Self {
            id,
            username,
            joined_at,
        }
    }
}

/// Result of a successful join, computed inside the room's critical section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    pub room_name: RoomName,
    pub is_host: bool,
    pub participant_count: usize,
    /// Retained messages, oldest first.
    pub backlog: Vec<ChatMessage>,
    /// Set only for the host's join, and only once per room.
    pub initial_message: Option<MessageText>,
}

/// Result of a participant leaving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeftRoom {
    pub participant: Participant,
    pub remaining: usize,
}

/// Outcome of appending a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// A message with the same id is already in the log; nothing was appended.
    Duplicate(ChatMessage),
    /// The id was relayed before and has since left the log; nothing was appended.
    AlreadyRelayed,
}

/// Effect of a status update on the stored copy of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Advanced,
    /// The stored copy is already at or past the requested status.
    Unchanged,
    /// The message has left the log.
    NotRetained,
}

/// One chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    /// First participant to join; never changes once set.
    pub host: Option<ConnectionId>,
    pub participants: Vec<Participant>,
    pub messages: VecDeque<ChatMessage>,
    pub created_at: Timestamp,
    pub initial_message: Option<MessageText>,
    message_retention: usize,
    /// Every id ever appended, including those evicted from `messages`.
    relayed_ids: HashSet<MessageId>,
    closed: bool,
}

impl Room {
    pub fn new(
        id: RoomId,
        name: RoomName,
        created_at: Timestamp,
        initial_message: Option<MessageText>,
    ) -> Self {
        Self::with_retention(id, name, created_at, initial_message, DEFAULT_MESSAGE_RETENTION)
    }

    pub fn with_retention(
        id: RoomId,
        name: RoomName,
        created_at: Timestamp,
        initial_message: Option<MessageText>,
        message_retention: usize,
    ) -> Self {
        Self {
            id,
            name,
            host: None,
            participants: Vec::new(),
            messages: VecDeque::with_capacity(message_retention),
            created_at,
            initial_message,
            message_retention: message_retention.max(1),
            relayed_ids: HashSet::new(),
            closed: false,
        }
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Mark the room as removed from the registry. Joins are refused afterwards.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn participant(&self, id: &ConnectionId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn is_host(&self, id: &ConnectionId) -> bool {
        self.host.as_ref() == Some(id)
    }

    /// Add a participant, electing it host if the room has none yet.
    pub fn join(&mut self, participant: Participant) -> Result<JoinedRoom, RoomError> {
        if self.closed {
            return Err(RoomError::Closed);
        }
        if self.participant(&participant.id).is_some() {
            return Err(RoomError::AlreadyJoined(participant.id.into_string()));
        }

        let is_host = match &self.host {
            Some(host) => host == &participant.id,
            None => {
                self.host = Some(participant.id.clone());
                true
            }
        };
        self.participants.push(participant);

        Ok(JoinedRoom {
            room_name: self.name.clone(),
            is_host,
            participant_count: self.participants.len(),
            backlog: self.backlog(self.message_retention),
            initial_message: if is_host {
                self.initial_message.take()
            } else {
                None
            },
        })
    }

    pub fn leave(&mut self, id: &ConnectionId) -> Result<LeftRoom, RoomError> {
        let index = self
            .participants
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| RoomError::NotJoined(id.as_str().to_string()))?;
        let participant = self.participants.remove(index);

        Ok(LeftRoom {
            participant,
            remaining: self.participants.len(),
        })
    }

    /// Append to the log, dropping the oldest message past the retention bound.
    pub fn append_message(&mut self, message: ChatMessage) -> Result<AppendOutcome, RoomError> {
        if self.closed {
            return Err(RoomError::Closed);
        }
        if let Some(sender) = &message.sender
            && self.participant(sender).is_none()
        {
            return Err(RoomError::NotJoined(sender.as_str().to_string()));
        }
        if let Some(existing) = self.messages.iter().find(|m| m.id == message.id) {
            return Ok(AppendOutcome::Duplicate(existing.clone()));
        }
        if !self.relayed_ids.insert(message.id.clone()) {
            return Ok(AppendOutcome::AlreadyRelayed);
        }

        if self.messages.len() == self.message_retention {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
        Ok(AppendOutcome::Appended)
    }

    /// Move the stored copy of a message forward.
    pub fn advance_message_status(&mut self, id: &MessageId, status: MessageStatus) -> StatusChange {
        match self.messages.iter_mut().find(|m| &m.id == id) {
            Some(message) if message.status.can_advance_to(status) => {
                message.status = status;
                StatusChange::Advanced
            }
            Some(_) => StatusChange::Unchanged,
            None => StatusChange::NotRetained,
        }
    }

    /// The last `limit` messages, oldest first.
    pub fn backlog(&self, limit: usize) -> Vec<ChatMessage> {
        let skip = self.messages.len().saturating_sub(limit);
        self.messages.iter().skip(skip).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{MessageIdFactory, RoomIdFactory};

    fn create_test_room() -> Room {
        Room::new(
            RoomIdFactory::generate(),
            RoomName::default(),
            Timestamp::new(1000),
            None,
        )
    }

    fn participant(id: &str) -> Participant {
        Participant::new(
            ConnectionId::new(id.to_string()).unwrap(),
            Username::new(id.to_string()).unwrap(),
            Timestamp::new(1000),
        )
    }

    fn message_from(sender: &str, text: &str) -> ChatMessage {
        ChatMessage::new(
            MessageIdFactory::generate(),
            MessageText::new(text.to_string()).unwrap(),
            ConnectionId::new(sender.to_string()).unwrap(),
            Username::new(sender.to_string()).unwrap(),
            Timestamp::new(2000),
        )
    }

    #[test]
    fn test_first_joiner_becomes_host() {
        // テスト項目: 最初の参加者がホストになり、2人目が参加してもホストは変わらない
        // given (前提条件):
        let mut room = create_test_room();

        // when (操作):
        let alice = room.join(participant("alice")).unwrap();
        let bob = room.join(participant("bob")).unwrap();

        // then (期待する結果):
        assert!(alice.is_host);
        assert!(!bob.is_host);
        assert_eq!(bob.participant_count, 2);
        assert_eq!(room.host.as_ref().map(|h| h.as_str()), Some("alice"));
    }

    #[test]
    fn test_host_stays_after_host_leaves() {
        // テスト項目: ホストが退出しても hostConnectionId は変更されない
        // given (前提条件):
        let mut room = create_test_room();
        room.join(participant("alice")).unwrap();
        room.join(participant("bob")).unwrap();

        // when (操作):
        let left = room.leave(&ConnectionId::new("alice".to_string()).unwrap()).unwrap();
        let carol = room.join(participant("carol")).unwrap();

        // then (期待する結果):
        assert_eq!(left.remaining, 1);
        assert!(!carol.is_host);
        assert_eq!(room.host.as_ref().map(|h| h.as_str()), Some("alice"));
    }

    #[test]
    fn test_duplicate_join_is_rejected() {
        // テスト項目: 同じ接続 ID での二重参加はエラーになる
        // given (前提条件):
        let mut room = create_test_room();
        room.join(participant("alice")).unwrap();

        // when (操作):
        let result = room.join(participant("alice"));

        // then (期待する結果):
        assert_eq!(result, Err(RoomError::AlreadyJoined("alice".to_string())));
        assert_eq!(room.participant_count(), 1);
    }

    #[test]
    fn test_initial_message_is_handed_out_once() {
        // テスト項目: 初期メッセージはホストの参加時に一度だけ取り出される
        // given (前提条件):
        let mut room = Room::new(
            RoomIdFactory::generate(),
            RoomName::default(),
            Timestamp::new(1000),
            Some(MessageText::new("hi".to_string()).unwrap()),
        );

        // when (操作):
        let host = room.join(participant("alice")).unwrap();
        let guest = room.join(participant("bob")).unwrap();

        // then (期待する結果):
        assert_eq!(host.initial_message.map(|t| t.into_string()), Some("hi".to_string()));
        assert_eq!(guest.initial_message, None);
        assert_eq!(room.initial_message, None);
    }

    #[test]
    fn test_closed_room_refuses_join() {
        // テスト項目: 削除済み（closed）の Room には参加できない
        // given (前提条件):
        let mut room = create_test_room();
        room.close();

        // when (操作):
        let result = room.join(participant("alice"));

        // then (期待する結果):
        assert_eq!(result, Err(RoomError::Closed));
    }

    #[test]
    fn test_append_requires_membership() {
        // テスト項目: 参加していない送信者のメッセージは追加されない
        // given (前提条件):
        let mut room = create_test_room();

        // when (操作):
        let result = room.append_message(message_from("mallory", "hello"));

        // then (期待する結果):
        assert_eq!(result, Err(RoomError::NotJoined("mallory".to_string())));
        assert!(room.messages.is_empty());
    }

    #[test]
    fn test_append_with_duplicate_id_is_idempotent() {
        // テスト項目: 同じ ID のメッセージは二重に追加されない
        // given (前提条件):
        let mut room = create_test_room();
        room.join(participant("alice")).unwrap();
        let message = message_from("alice", "hello");
        room.append_message(message.clone()).unwrap();

        // when (操作):
        let result = room.append_message(message.clone()).unwrap();

        // then (期待する結果):
        assert_eq!(result, AppendOutcome::Duplicate(message));
        assert_eq!(room.messages.len(), 1);
    }

    #[test]
    fn test_retention_drops_oldest_messages() {
        // テスト項目: 保持件数を超えると古いメッセージから破棄され、backlog は古い順
        // given (前提条件):
        let mut room = Room::with_retention(
            RoomIdFactory::generate(),
            RoomName::default(),
            Timestamp::new(1000),
            None,
            3,
        );
        room.join(participant("alice")).unwrap();

        // when (操作):
        for i in 0..5 {
            room.append_message(message_from("alice", &format!("m{}", i)))
                .unwrap();
        }

        // then (期待する結果):
        let texts: Vec<String> = room
            .backlog(10)
            .into_iter()
            .map(|m| m.text.into_string())
            .collect();
        assert_eq!(texts, vec!["m2", "m3", "m4"]);
        assert_eq!(room.backlog(2).len(), 2);
        assert_eq!(room.backlog(2)[0].text.as_str(), "m3");
    }

    #[test]
    fn test_status_only_advances() {
        // テスト項目: ステータスは sent → delivered → read の順にのみ進む
        // given (前提条件):
        let mut room = create_test_room();
        room.join(participant("alice")).unwrap();
        let message = message_from("alice", "hello");
        let id = message.id.clone();
        room.append_message(message).unwrap();

        // when (操作) / then (期待する結果):
        assert_eq!(
            room.advance_message_status(&id, MessageStatus::Read),
            StatusChange::Advanced
        );
        assert_eq!(
            room.advance_message_status(&id, MessageStatus::Delivered),
            StatusChange::Unchanged
        );
        assert_eq!(
            room.advance_message_status(&id, MessageStatus::Sent),
            StatusChange::Unchanged
        );
        assert_eq!(room.messages[0].status, MessageStatus::Read);
    }

    #[test]
    fn test_evicted_message_is_not_retained_and_not_reappended() {
        // テスト項目: 履歴から押し出されたメッセージはステータス更新で NotRetained となり、同じ ID で再追加されない
        // given (前提条件):
        let mut room = Room::with_retention(
            RoomIdFactory::generate(),
            RoomName::default(),
            Timestamp::new(1000),
            None,
            2,
        );
        room.join(participant("alice")).unwrap();
        let first = message_from("alice", "m0");
        room.append_message(first.clone()).unwrap();
        room.append_message(message_from("alice", "m1")).unwrap();
        room.append_message(message_from("alice", "m2")).unwrap();

        // when (操作):
        let change = room.advance_message_status(&first.id, MessageStatus::Delivered);
        let resend = room.append_message(first).unwrap();

        // then (期待する結果):
        assert_eq!(change, StatusChange::NotRetained);
        assert_eq!(resend, AppendOutcome::AlreadyRelayed);
        let texts: Vec<&str> = room.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["m1", "m2"]);
    }

    #[test]
    fn test_error_status_is_terminal() {
        // テスト項目: error は終端状態で、そこから先へは進まない
        // when (操作) / then (期待する結果):
        assert!(MessageStatus::Delivered.can_advance_to(MessageStatus::Error));
        assert!(!MessageStatus::Error.can_advance_to(MessageStatus::Read));
        assert!(!MessageStatus::Error.can_advance_to(MessageStatus::Error));
    }
}
