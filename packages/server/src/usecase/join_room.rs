//! UseCase: ルーム参加処理
//!
//! ## 処理の流れ
//!
//! 1. 配信チャンネルを MessagePusher に登録（重複接続はここで拒否）
//! 2. Repository 経由で参加者を追加（ホスト選出も同じクリティカルセクション）
//! 3. 参加者本人に room-joined（直近の履歴付き）を送信
//! 4. 他の参加者に user-joined をブロードキャスト
//! 5. ホストの参加で初期メッセージがあれば、遅延送信をスケジュール

use std::sync::Arc;

use bisik_shared::time::Clock;

use crate::{
    config::RelayConfig,
    domain::{
        AppendOutcome, ChatMessage, ConnectionId, MessageIdFactory, MessagePusher, MessageText,
        Participant, PusherChannel, RoomEvent, RoomId, RoomRepository, Timestamp, Username,
    },
    infrastructure::scheduler::{TaskKey, TaskScheduler},
};

use super::{error::RelayError, reap_room::IdleRoomReaper};

/// Result of a successful join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    pub is_host: bool,
    pub participant_count: usize,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    scheduler: Arc<TaskScheduler>,
    reaper: Arc<IdleRoomReaper>,
    clock: Arc<dyn Clock>,
    config: Arc<RelayConfig>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        scheduler: Arc<TaskScheduler>,
        reaper: Arc<IdleRoomReaper>,
        clock: Arc<dyn Clock>,
        config: Arc<RelayConfig>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            scheduler,
            reaper,
            clock,
            config,
        }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 参加する Room
    /// * `connection_id` - 接続 ID（Room 内で一意）
    /// * `username` - 表示名
    /// * `sender` - この接続へのイベント配信チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome)` - 参加成功
    /// * `Err(RelayError::RoomNotFound)` - Room が存在しない（期限切れを含む）
    /// * `Err(RelayError::AlreadyJoined)` - 同じ接続 ID が既に参加している
    pub async fn execute(
        &self,
        room_id: RoomId,
        connection_id: ConnectionId,
        username: Username,
        sender: PusherChannel,
    ) -> Result<JoinOutcome, RelayError> {
        // 1. 配信先を登録
        let registered = self
            .message_pusher
            .register_client(&room_id, connection_id.clone(), username.clone(), sender)
            .await;
        if !registered {
            return Err(RelayError::AlreadyJoined(connection_id.into_string()));
        }

        // 2. 参加者を追加
        let participant = Participant::new(
            connection_id.clone(),
            username.clone(),
            Timestamp::new(self.clock.now_millis()),
        );
        let joined = match self.repository.add_participant(&room_id, participant).await {
            Ok(joined) => joined,
            Err(e) => {
                self.message_pusher
                    .unregister_client(&room_id, &connection_id)
                    .await;
                return Err(e.into());
            }
        };
        self.reaper.cancel_reap(&room_id);
        tracing::info!(
            "'{}' ({}) joined room '{}' ({} participant(s){})",
            username,
            connection_id,
            room_id,
            joined.participant_count,
            if joined.is_host { ", host" } else { "" }
        );

        // 3. 本人への参加通知（直近の履歴を古い順に）
        let ack = RoomEvent::RoomJoined {
            room_id: room_id.clone(),
            room_name: joined.room_name,
            participant_count: joined.participant_count,
            is_host: joined.is_host,
            messages: joined.backlog,
        };
        if let Err(e) = self
            .message_pusher
            .push_to(&room_id, &connection_id, &ack)
            .await
        {
            tracing::warn!("Failed to acknowledge join of '{}': {}", connection_id, e);
        }

        // 4. 他の参加者へ通知
        let joined_event = RoomEvent::UserJoined {
            username,
            participant_count: joined.participant_count,
        };
        if let Err(e) = self
            .message_pusher
            .broadcast(&room_id, &joined_event, Some(&connection_id))
            .await
        {
            tracing::warn!("Failed to broadcast user-joined: {}", e);
        }

        // 5. 初期メッセージ
        if let Some(text) = joined.initial_message {
            self.schedule_initial_message(room_id, text);
        }

        Ok(JoinOutcome {
            is_host: joined.is_host,
            participant_count: joined.participant_count,
        })
    }

    /// Send the room's initial message on the host's behalf after `initial_message_delay`.
    fn schedule_initial_message(&self, room_id: RoomId, text: MessageText) {
        let repository = Arc::clone(&self.repository);
        let message_pusher = Arc::clone(&self.message_pusher);
        let clock = Arc::clone(&self.clock);
        let key = TaskKey::InitialMessage(room_id.clone());

        self.scheduler
            .schedule(key, self.config.initial_message_delay, async move {
                let message = ChatMessage::from_host(
                    MessageIdFactory::generate(),
                    text,
                    Timestamp::new(clock.now_millis()),
                );
                match repository.add_message(&room_id, message.clone()).await {
                    Ok(AppendOutcome::Appended) => {
                        let event = RoomEvent::NewMessage(message);
                        if let Err(e) = message_pusher.broadcast(&room_id, &event, None).await {
                            tracing::warn!("Failed to broadcast initial message: {}", e);
                        }
                    }
                    Ok(AppendOutcome::Duplicate(_) | AppendOutcome::AlreadyRelayed) => {}
                    Err(e) => {
                        tracing::debug!("Initial message for room '{}' dropped: {}", room_id, e);
                    }
                }
            });
    }
}
