//! MessagePusher trait 定義
//!
//! 参加者へのイベント配信のインターフェース（ConnectionManager）。
//! 配信チャンネルは MessagePusher が排他的に所有し、Room は配信手段に触れない。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, RoomEvent, RoomId, Username};

/// Delivery handle of one connection. The transport task drains the receiver.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続を Room の配信先に登録
    ///
    /// 同じ ID の配信先が既に登録されている場合は何もせず `false` を返す。
    async fn register_client(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
        username: Username,
        sender: PusherChannel,
    ) -> bool;

    /// 接続の登録を解除
    ///
    /// 解除後に Room の配信先が空になっていれば `true` を返す。
    async fn unregister_client(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool;

    /// 特定の参加者にイベントを送信
    ///
    /// 送信に失敗した配信先は登録解除される。
    async fn push_to(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;

    /// Room の全配信先（`exclude` を除く）にイベントを送信
    ///
    /// 一部の送信失敗は許容し、失敗した配信先は登録解除される。
    /// 配信できた件数を返す。
    async fn broadcast(
        &self,
        room_id: &RoomId,
        event: &RoomEvent,
        exclude: Option<&ConnectionId>,
    ) -> Result<usize, MessagePushError>;

    /// Room に登録されている配信先の数
    async fn count_connections(&self, room_id: &RoomId) -> usize;
}
