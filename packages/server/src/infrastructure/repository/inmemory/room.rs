//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! Room ID → Room のマップをインメモリ DB として使用します。
//!
//! ## ロックの設計
//!
//! - マップ全体は `RwLock` で保護し、ルックアップ中だけ保持する
//! - 各 Room は個別の `Mutex` で保護し、参加者と履歴の変更はその中で行う
//! - ロック順序は常に「マップ → Room」。Room のロックを保持したままマップの
//!   ロックを取得することはない

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    AppendOutcome, ChatMessage, ConnectionId, JoinedRoom, LeftRoom, MessageId, MessageStatus,
    Participant, RepositoryError, Room, RoomId, RoomRepository, StatusChange,
};

type RoomHandle = Arc<Mutex<Room>>;

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// Room のハンドルを取得（マップのロックはすぐに解放される）
    async fn room_handle(&self, room_id: &RoomId) -> Result<RoomHandle, RepositoryError> {
        let rooms = self.rooms.read().await;
        rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn insert_room(&self, room: Room) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.write().await;
        let room_id = room.id.clone();
        rooms.insert(room_id.clone(), Arc::new(Mutex::new(room)));
        tracing::debug!("Room '{}' inserted ({} rooms)", room_id, rooms.len());
        Ok(())
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RepositoryError> {
        let handle = self.room_handle(room_id).await?;
        let room = handle.lock().await;
        Ok(room.clone())
    }

    async fn delete_room(&self, room_id: &RoomId) -> bool {
        let mut rooms = self.rooms.write().await;
        match rooms.remove(room_id) {
            Some(handle) => {
                handle.lock().await.close();
                true
            }
            None => false,
        }
    }

    async fn delete_room_if_empty(&self, room_id: &RoomId) -> Result<bool, RepositoryError> {
        let mut rooms = self.rooms.write().await;
        let handle = rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))?;

        let mut room = handle.lock().await;
        if !room.is_empty() {
            return Ok(false);
        }
        room.close();
        rooms.remove(room_id);
        Ok(true)
    }

    async fn add_participant(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<JoinedRoom, RepositoryError> {
        let handle = self.room_handle(room_id).await?;
        let mut room = handle.lock().await;
        room.join(participant)
            .map_err(|e| RepositoryError::from_room_error(room_id.as_str(), e))
    }

    async fn remove_participant(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<LeftRoom, RepositoryError> {
        let handle = self.room_handle(room_id).await?;
        let mut room = handle.lock().await;
        room.leave(connection_id)
            .map_err(|e| RepositoryError::from_room_error(room_id.as_str(), e))
    }

    async fn get_participant(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<Participant, RepositoryError> {
        let handle = self.room_handle(room_id).await?;
        let room = handle.lock().await;
        room.participant(connection_id)
            .cloned()
            .ok_or_else(|| RepositoryError::ParticipantNotFound(connection_id.as_str().to_string()))
    }

    async fn add_message(
        &self,
        room_id: &RoomId,
        message: ChatMessage,
    ) -> Result<AppendOutcome, RepositoryError> {
        let handle = self.room_handle(room_id).await?;
        let mut room = handle.lock().await;
        room.append_message(message)
            .map_err(|e| RepositoryError::from_room_error(room_id.as_str(), e))
    }

    async fn update_message_status(
        &self,
        room_id: &RoomId,
        message_id: &MessageId,
        status: MessageStatus,
    ) -> Result<StatusChange, RepositoryError> {
        let handle = self.room_handle(room_id).await?;
        let mut room = handle.lock().await;
        Ok(room.advance_message_status(message_id, status))
    }

    async fn count_participants(&self, room_id: &RoomId) -> Result<usize, RepositoryError> {
        let handle = self.room_handle(room_id).await?;
        let room = handle.lock().await;
        Ok(room.participant_count())
    }

    async fn count_rooms(&self) -> usize {
        self.rooms.read().await.len()
    }
}
