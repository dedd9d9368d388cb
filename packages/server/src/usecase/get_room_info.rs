//! UseCase: ルーム情報取得処理

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository};

use super::error::RelayError;

pub struct GetRoomInfoUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomInfoUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// Look up a room by its raw id.
    ///
    /// A blank id is `InvalidInput`; an id that cannot exist is `RoomNotFound`.
    pub async fn execute(&self, room_id: &str) -> Result<Room, RelayError> {
        let room_id = room_id.trim();
        if room_id.is_empty() {
            return Err(RelayError::InvalidInput("room id is required".to_string()));
        }
        let room_id = RoomId::new(room_id.to_string())
            .map_err(|_| RelayError::RoomNotFound(room_id.to_string()))?;

        Ok(self.repository.get_room(&room_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::testing::Fixture;

    #[tokio::test]
    async fn test_get_room_info_success() {
        // テスト項目: 作成済みの Room の情報を取得できる
        // given (前提条件):
        let fixture = Fixture::new();
        let room_id = fixture.create_room(None).await;
        let usecase = GetRoomInfoUseCase::new(fixture.repository.clone());

        // when (操作):
        let room = usecase.execute(room_id.as_str()).await.unwrap();

        // then (期待する結果):
        assert_eq!(room.id, room_id);
        assert_eq!(room.participant_count(), 0);
    }

    #[tokio::test]
    async fn test_get_room_info_errors() {
        // テスト項目: 空の ID は InvalidInput、存在しない・不正な ID は RoomNotFound
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = GetRoomInfoUseCase::new(fixture.repository.clone());

        // when (操作) / then (期待する結果):
        assert!(matches!(
            usecase.execute("  ").await,
            Err(RelayError::InvalidInput(_))
        ));
        assert!(matches!(
            usecase.execute("no-such-room").await,
            Err(RelayError::RoomNotFound(_))
        ));
        assert!(matches!(
            usecase.execute("../etc").await,
            Err(RelayError::RoomNotFound(_))
        ));
    }
}
