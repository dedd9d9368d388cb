//! Idle room reaper
//!
//! Room を削除する唯一の仕組み。最後の参加者が抜けてから一定時間後に、
//! まだ空であれば Room を削除する。猶予期間中に誰かが参加すれば削除されない。

use std::{sync::Arc, time::Duration};

use crate::{
    domain::{RoomId, RoomRepository},
    infrastructure::scheduler::{TaskKey, TaskScheduler},
};

pub struct IdleRoomReaper {
    repository: Arc<dyn RoomRepository>,
    scheduler: Arc<TaskScheduler>,
    delay: Duration,
}

impl IdleRoomReaper {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        scheduler: Arc<TaskScheduler>,
        delay: Duration,
    ) -> Self {
        Self {
            repository,
            scheduler,
            delay,
        }
    }

    /// Arm the reap timer for a room, replacing any pending one.
    pub fn schedule_reap(&self, room_id: RoomId) {
        tracing::debug!("Room '{}' is empty, reaping in {:?}", room_id, self.delay);
        let repository = Arc::clone(&self.repository);
        self.scheduler
            .schedule(TaskKey::Reap(room_id.clone()), self.delay, async move {
                reap_if_idle(repository.as_ref(), &room_id).await;
            });
    }

    /// Disarm the reap timer. Returns `true` if one was pending.
    pub fn cancel_reap(&self, room_id: &RoomId) -> bool {
        self.scheduler.cancel(&TaskKey::Reap(room_id.clone()))
    }
}

/// Delete the room if it still has no participants. Returns `true` if deleted.
pub async fn reap_if_idle(repository: &dyn RoomRepository, room_id: &RoomId) -> bool {
    match repository.delete_room_if_empty(room_id).await {
        Ok(true) => {
            tracing::info!("Room '{}' deleted due to inactivity", room_id);
            true
        }
        Ok(false) => {
            tracing::debug!("Room '{}' is occupied again, keeping it", room_id);
            false
        }
        Err(e) => {
            tracing::debug!("Room '{}' already gone: {}", room_id, e);
            false
        }
    }
}
