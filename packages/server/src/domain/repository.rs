//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    AppendOutcome, ChatMessage, ConnectionId, JoinedRoom, LeftRoom, MessageId, MessageStatus,
    Participant, RepositoryError, Room, RoomId, StatusChange,
};

/// Room Repository trait (the room registry)
///
/// 各 Room への変更は Room 単位の排他制御の中で行われ、
/// ある Room の処理が他の Room の処理を待たせることはない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Room を登録
    async fn insert_room(&self, room: Room) -> Result<(), RepositoryError>;

    /// Room のスナップショットを取得
    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RepositoryError>;

    /// Room を削除（存在しない場合は何もしない）
    ///
    /// 削除した場合は `true` を返す。
    async fn delete_room(&self, room_id: &RoomId) -> bool;

    /// 参加者が 0 人の場合に限り Room を削除
    ///
    /// 参加者数の確認と削除は同じクリティカルセクションで行われる。
    async fn delete_room_if_empty(&self, room_id: &RoomId) -> Result<bool, RepositoryError>;

    /// 参加者を追加（最初の参加者はホストになる）
    async fn add_participant(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<JoinedRoom, RepositoryError>;

    /// 参加者を削除
    async fn remove_participant(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<LeftRoom, RepositoryError>;

    /// 参加者を取得
    async fn get_participant(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<Participant, RepositoryError>;

    /// メッセージを Room に追加
    async fn add_message(
        &self,
        room_id: &RoomId,
        message: ChatMessage,
    ) -> Result<AppendOutcome, RepositoryError>;

    /// 保存されているメッセージのステータスを進める（後退はしない）
    async fn update_message_status(
        &self,
        room_id: &RoomId,
        message_id: &MessageId,
        status: MessageStatus,
    ) -> Result<StatusChange, RepositoryError>;

    /// Room の参加者数を取得
    async fn count_participants(&self, room_id: &RoomId) -> Result<usize, RepositoryError>;

    /// 登録されている Room の数を取得
    async fn count_rooms(&self) -> usize;
}
