//! UseCase: ルーム作成処理

use std::sync::Arc;

use bisik_shared::time::Clock;

use crate::{
    config::RelayConfig,
    domain::{MessageText, Room, RoomId, RoomIdFactory, RoomName, RoomRepository, Timestamp},
};

use super::error::RelayError;

/// Identifier and shareable link of a new room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRoom {
    pub room_id: RoomId,
    pub room_url: String,
}

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
    config: Arc<RelayConfig>,
}

impl CreateRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        clock: Arc<dyn Clock>,
        config: Arc<RelayConfig>,
    ) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    /// ルーム作成を実行
    ///
    /// # Arguments
    ///
    /// * `room_name` - 表示名（未指定・空白のみの場合は既定の名前）
    /// * `initial_message` - ホスト参加時に一度だけ送信されるメッセージ
    pub async fn execute(
        &self,
        room_name: Option<String>,
        initial_message: Option<String>,
    ) -> Result<CreatedRoom, RelayError> {
        let name = match room_name.filter(|n| !n.trim().is_empty()) {
            Some(name) => RoomName::new(name)?,
            None => RoomName::new(self.config.default_room_name.clone())?,
        };
        let initial_message = initial_message
            .filter(|m| !m.trim().is_empty())
            .map(MessageText::new)
            .transpose()?;

        let room_id = RoomIdFactory::generate();
        let room = Room::with_retention(
            room_id.clone(),
            name,
            Timestamp::new(self.clock.now_millis()),
            initial_message,
            self.config.backlog_limit,
        );
        self.repository.insert_room(room).await?;

        tracing::info!("Room '{}' created", room_id);
        Ok(CreatedRoom {
            room_url: self.config.room_url(&room_id),
            room_id,
        })
    }
}
