//! UseCase: 退出・切断処理
//!
//! 明示的な退出とトランスポートの切断は同じ処理として扱う。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomEvent, RoomId, RoomRepository};

use super::{error::RelayError, reap_room::IdleRoomReaper};

/// Result of a leave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub remaining: usize,
    pub reap_scheduled: bool,
}

/// 退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    reaper: Arc<IdleRoomReaper>,
}

impl LeaveRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        reaper: Arc<IdleRoomReaper>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            reaper,
        }
    }

    /// 退出を実行
    ///
    /// 配信先の登録解除は参加者の有無に関係なく行う。
    /// 参加者が残っていれば user-left をブロードキャストし、
    /// Room が空になれば削除を予約する。
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<LeaveOutcome, RelayError> {
        // 1. 配信先の登録解除
        let delivery_empty = self
            .message_pusher
            .unregister_client(room_id, connection_id)
            .await;

        // 2. 参加者を削除
        let left = self
            .repository
            .remove_participant(room_id, connection_id)
            .await?;
        tracing::info!(
            "'{}' ({}) left room '{}' ({} remaining)",
            left.participant.username,
            connection_id,
            room_id,
            left.remaining
        );

        // 3. 残りの参加者に通知
        if left.remaining > 0 {
            let event = RoomEvent::UserLeft {
                username: left.participant.username,
                participant_count: left.remaining,
            };
            if let Err(e) = self.message_pusher.broadcast(room_id, &event, None).await {
                tracing::warn!("Failed to broadcast user-left: {}", e);
            }
        }

        // 4. 空になった Room の削除予約
        let reap_scheduled = left.remaining == 0 || delivery_empty;
        if reap_scheduled {
            self.reaper.schedule_reap(room_id.clone());
        }

        Ok(LeaveOutcome {
            remaining: left.remaining,
            reap_scheduled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::scheduler::TaskKey,
        usecase::testing::{Fixture, drain_events},
    };

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_leave_notifies_remaining_participants() {
        // テスト項目: 退出すると残りの参加者に user-left が届き、削除は予約されない
        // given (前提条件):
        let fixture = Fixture::new();
        let room_id = fixture.create_room(None).await;
        let (_, mut rx_a) = fixture.join(&room_id, "alice").await;
        let (_, mut rx_b) = fixture.join(&room_id, "bob").await;
        drain_events(&mut rx_a);

        // when (操作):
        let outcome = fixture
            .leave_room_usecase()
            .execute(&room_id, &connection("bob"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            outcome,
            LeaveOutcome {
                remaining: 1,
                reap_scheduled: false
            }
        );
        let events = drain_events(&mut rx_a);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "user-left");
        assert_eq!(events[0]["username"], "bob");
        assert_eq!(events[0]["participantCount"], 1);
        assert!(rx_b.recv().await.is_some()); // room-joined only; channel then closes
        assert_eq!(rx_b.recv().await, None);
    }

    #[tokio::test]
    async fn test_last_leave_schedules_reap() {
        // テスト項目: 最後の参加者が退出すると Room の削除が予約される
        // given (前提条件):
        let fixture = Fixture::new();
        let room_id = fixture.create_room(None).await;
        let (_, _rx) = fixture.join(&room_id, "alice").await;

        // when (操作):
        let outcome = fixture
            .leave_room_usecase()
            .execute(&room_id, &connection("alice"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.remaining, 0);
        assert!(outcome.reap_scheduled);
        assert!(fixture.scheduler.is_pending(&TaskKey::Reap(room_id)));
    }

    #[tokio::test]
    async fn test_leave_without_join() {
        // テスト項目: 参加していない接続の退出は NotJoined
        // given (前提条件):
        let fixture = Fixture::new();
        let room_id = fixture.create_room(None).await;

        // when (操作):
        let result = fixture
            .leave_room_usecase()
            .execute(&room_id, &connection("ghost"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RelayError::NotJoined("ghost".to_string())));
    }
}
