//! Channel-based MessagePusher 実装 (ConnectionManager)
//!
//! ## 責務
//!
//! - Room ごとに `(ConnectionId → 配信チャンネル)` を管理
//! - 特定の参加者への送信（push_to）と Room 全体への送信（broadcast）
//!
//! ## 設計ノート
//!
//! 配信チャンネルの生成は UI 層（WebSocket / SSE ハンドラ）で行われます。
//! broadcast は配信先をスナップショットしてからロックを解放し、その後に送信します。
//! 送信に失敗した配信先（受信側が閉じている）は送信後に登録解除されます。

use std::collections::{HashMap, hash_map::Entry};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    domain::{
        ConnectionId, MessagePushError, MessagePusher, PusherChannel, RoomEvent, RoomId, Username,
    },
    infrastructure::dto::conversion::encode_event,
};

/// Registered connection.
struct Connection {
    username: Username,
    sender: PusherChannel,
}

/// Channel-based MessagePusher 実装
#[derive(Default)]
pub struct ChannelMessagePusher {
    /// Key: room id, Value: connection id → connection
    rooms: RwLock<HashMap<RoomId, HashMap<ConnectionId, Connection>>>,
}

impl ChannelMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove handles whose send failed, unless they were replaced in the meantime.
    async fn remove_dead(&self, room_id: &RoomId, dead: Vec<(ConnectionId, PusherChannel)>) {
        if dead.is_empty() {
            return;
        }
        let mut rooms = self.rooms.write().await;
        let Some(connections) = rooms.get_mut(room_id) else {
            return;
        };
        for (connection_id, sender) in dead {
            let is_same = connections
                .get(&connection_id)
                .is_some_and(|c| c.sender.same_channel(&sender));
            if is_same {
                let connection = connections.remove(&connection_id);
                tracing::warn!(
                    "Removed dead delivery handle '{}' ({}) from room '{}'",
                    connection_id,
                    connection.map(|c| c.username.into_string()).unwrap_or_default(),
                    room_id
                );
            }
        }
        if connections.is_empty() {
            rooms.remove(room_id);
        }
    }
}

#[async_trait]
impl MessagePusher for ChannelMessagePusher {
    async fn register_client(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
        username: Username,
        sender: PusherChannel,
    ) -> bool {
        let mut rooms = self.rooms.write().await;
        match rooms.entry(room_id.clone()).or_default().entry(connection_id) {
            Entry::Occupied(entry) => {
                tracing::warn!(
                    "Client '{}' is already registered to room '{}'",
                    entry.key(),
                    room_id
                );
                false
            }
            Entry::Vacant(entry) => {
                tracing::debug!(
                    "Client '{}' registered to room '{}'",
                    entry.key(),
                    room_id
                );
                entry.insert(Connection { username, sender });
                true
            }
        }
    }

    async fn unregister_client(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(connections) = rooms.get_mut(room_id) else {
            return true;
        };
        if connections.remove(connection_id).is_some() {
            tracing::debug!(
                "Client '{}' unregistered from room '{}'",
                connection_id,
                room_id
            );
        }
        let is_empty = connections.is_empty();
        if is_empty {
            rooms.remove(room_id);
        }
        is_empty
    }

    async fn push_to(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let content = encode_event(event).map_err(|e| MessagePushError::PushFailed(e.to_string()))?;

        let sender = {
            let rooms = self.rooms.read().await;
            rooms
                .get(room_id)
                .and_then(|connections| connections.get(connection_id))
                .map(|c| c.sender.clone())
                .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.as_str().to_string()))?
        };

        if let Err(e) = sender.send(content) {
            self.remove_dead(room_id, vec![(connection_id.clone(), sender)])
                .await;
            return Err(MessagePushError::PushFailed(e.to_string()));
        }
        tracing::debug!("Pushed '{}' to client '{}'", event.kind(), connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        room_id: &RoomId,
        event: &RoomEvent,
        exclude: Option<&ConnectionId>,
    ) -> Result<usize, MessagePushError> {
        let content = encode_event(event).map_err(|e| MessagePushError::PushFailed(e.to_string()))?;

        let targets: Vec<(ConnectionId, PusherChannel)> = {
            let rooms = self.rooms.read().await;
            match rooms.get(room_id) {
                Some(connections) => connections
                    .iter()
                    .filter(|(id, _)| Some(*id) != exclude)
                    .map(|(id, c)| (id.clone(), c.sender.clone()))
                    .collect(),
                None => Vec::new(),
            }
        };

        let mut delivered = 0;
        let mut dead = Vec::new();
        for (connection_id, sender) in targets {
            // ブロードキャストでは一部の送信失敗を許容
            if sender.send(content.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push((connection_id, sender));
            }
        }
        self.remove_dead(room_id, dead).await;

        tracing::debug!(
            "Broadcasted '{}' to {} client(s) in room '{}'",
            event.kind(),
            delivered,
            room_id
        );
        Ok(delivered)
    }

    async fn count_connections(&self, room_id: &RoomId) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map_or(0, HashMap::len)
    }
}
