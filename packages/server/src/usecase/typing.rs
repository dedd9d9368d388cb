//! UseCase: 入力中通知処理
//!
//! 永続化はせず、送信者以外の参加者に user-typing を中継するだけ。
//! レート制限は行わない（クライアント側でデバウンスする前提）。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomEvent, RoomId, RoomRepository};

use super::error::RelayError;

pub struct TypingUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl TypingUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// Relay a typing indicator. Returns the number of participants reached.
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        is_typing: bool,
    ) -> Result<usize, RelayError> {
        let participant = self
            .repository
            .get_participant(room_id, connection_id)
            .await?;

        let event = RoomEvent::UserTyping {
            username: participant.username,
            typing: is_typing,
        };
        let delivered = self
            .message_pusher
            .broadcast(room_id, &event, Some(connection_id))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to broadcast typing state: {}", e);
                0
            });
        Ok(delivered)
    }
}
