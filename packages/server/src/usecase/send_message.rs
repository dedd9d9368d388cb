//! UseCase: メッセージ送信処理
//!
//! メッセージは送信者を含む Room の全参加者にブロードキャストされる
//! （送信者は `id` で楽観的に表示したメッセージと照合する）。
//! その後、固定の遅延で `delivered`、さらに長い遅延で `read` の
//! ステータス更新がブロードキャストされる。これは実際の既読通知ではなく、
//! 受信側の状態に関係なく発火する擬似的な確認応答である。

use std::{sync::Arc, time::Duration};

use bisik_shared::time::Clock;

use crate::{
    config::RelayConfig,
    domain::{
        AppendOutcome, ChatMessage, ConnectionId, MessageId, MessageIdFactory, MessagePusher,
        MessageStatus, MessageText, RoomEvent, RoomId, RoomRepository, StatusChange, Timestamp,
    },
    infrastructure::scheduler::{TaskKey, TaskScheduler},
};

use super::error::RelayError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    scheduler: Arc<TaskScheduler>,
    clock: Arc<dyn Clock>,
    config: Arc<RelayConfig>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        scheduler: Arc<TaskScheduler>,
        clock: Arc<dyn Clock>,
        config: Arc<RelayConfig>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            scheduler,
            clock,
            config,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 送信先の Room
    /// * `connection_id` - 送信者の接続 ID（Room に参加済みであること）
    /// * `text` - メッセージ本文（変換せずにそのまま中継する）
    /// * `client_message_id` - クライアントが指定した ID（冪等性トークン）
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 追加されたメッセージ。同じ ID が既にあれば既存のメッセージ
    /// * `Err(RelayError)` - RoomNotFound / NotJoined / InvalidInput
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        text: String,
        client_message_id: Option<String>,
    ) -> Result<ChatMessage, RelayError> {
        let text = MessageText::new(text)?;
        let message_id = match client_message_id.filter(|id| !id.is_empty()) {
            Some(id) => MessageId::new(id)?,
            None => MessageIdFactory::generate(),
        };

        // 1. 送信者を確認（表示名の取得を兼ねる）
        let sender = self
            .repository
            .get_participant(room_id, connection_id)
            .await?;

        // 2. Room の履歴に追加（タイムスタンプはサーバー受信時刻）
        let message = ChatMessage::new(
            message_id,
            text,
            connection_id.clone(),
            sender.username,
            Timestamp::new(self.clock.now_millis()),
        );
        match self.repository.add_message(room_id, message.clone()).await? {
            AppendOutcome::Appended => {}
            AppendOutcome::Duplicate(existing) => {
                tracing::debug!("Message '{}' already relayed, ignoring resend", existing.id);
                return Ok(existing);
            }
            AppendOutcome::AlreadyRelayed => {
                tracing::debug!("Message '{}' relayed earlier, ignoring resend", message.id);
                return Ok(message);
            }
        }

        // 3. 送信者を含む全員にブロードキャスト
        let event = RoomEvent::NewMessage(message.clone());
        if let Err(e) = self.message_pusher.broadcast(room_id, &event, None).await {
            tracing::warn!("Failed to broadcast message '{}': {}", message.id, e);
        }

        // 4. ステータス更新を予約
        self.schedule_status_update(
            room_id.clone(),
            message.id.clone(),
            MessageStatus::Delivered,
            self.config.delivered_delay,
        );
        self.schedule_status_update(
            room_id.clone(),
            message.id.clone(),
            MessageStatus::Read,
            self.config.read_delay,
        );

        Ok(message)
    }

    /// Cancel the pending status updates of a message.
    pub fn cancel_status_updates(&self, room_id: &RoomId, message_id: &MessageId) {
        for status in [MessageStatus::Delivered, MessageStatus::Read] {
            self.scheduler.cancel(&TaskKey::StatusUpdate(
                room_id.clone(),
                message_id.clone(),
                status,
            ));
        }
    }

    fn schedule_status_update(
        &self,
        room_id: RoomId,
        message_id: MessageId,
        status: MessageStatus,
        delay: Duration,
    ) {
        let repository = Arc::clone(&self.repository);
        let message_pusher = Arc::clone(&self.message_pusher);
        let key = TaskKey::StatusUpdate(room_id.clone(), message_id.clone(), status);

        self.scheduler.schedule(key, delay, async move {
            // 履歴から押し出されたメッセージでも更新は通知する
            match repository
                .update_message_status(&room_id, &message_id, status)
                .await
            {
                Ok(StatusChange::Advanced) => {}
                Ok(StatusChange::NotRetained) => {
                    tracing::debug!("Message '{}' no longer retained", message_id);
                }
                Ok(StatusChange::Unchanged) => {
                    tracing::debug!("Message '{}' already past {:?}", message_id, status);
                    return;
                }
                Err(e) => {
                    tracing::debug!("Status update for '{}' dropped: {}", message_id, e);
                    return;
                }
            }
            let event = RoomEvent::MessageStatusUpdate { message_id, status };
            if let Err(e) = message_pusher.broadcast(&room_id, &event, None).await {
                tracing::warn!("Failed to broadcast status update: {}", e);
            }
        });
    }
}
