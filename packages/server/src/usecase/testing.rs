//! Shared fixtures for usecase tests.

use std::{sync::Arc, time::Duration};

use bisik_shared::time::{Clock, FixedClock};
use tokio::sync::mpsc;

use crate::{
    config::RelayConfig,
    domain::{ConnectionId, RoomId, Username},
    infrastructure::{
        message_pusher::ChannelMessagePusher, repository::InMemoryRoomRepository,
        scheduler::TaskScheduler,
    },
};

use super::{
    CreateRoomUseCase, IdleRoomReaper, JoinOutcome, JoinRoomUseCase, LeaveRoomUseCase,
    SendMessageUseCase,
};

pub(crate) struct Fixture {
    pub repository: Arc<InMemoryRoomRepository>,
    pub pusher: Arc<ChannelMessagePusher>,
    pub scheduler: Arc<TaskScheduler>,
    pub reaper: Arc<IdleRoomReaper>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<RelayConfig>,
}

impl Fixture {
    /// Time reported by the fixture clock.
    pub const NOW: i64 = 1_700_000_000_000;

    pub fn new() -> Self {
        Self::with_config(fast_config())
    }

    pub fn with_backlog_limit(backlog_limit: usize) -> Self {
        Self::with_config(RelayConfig {
            backlog_limit,
            ..fast_config()
        })
    }

    fn with_config(config: RelayConfig) -> Self {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let scheduler = Arc::new(TaskScheduler::new());
        let reaper = Arc::new(IdleRoomReaper::new(
            repository.clone(),
            scheduler.clone(),
            config.reap_delay,
        ));
        Self {
            repository,
            pusher: Arc::new(ChannelMessagePusher::new()),
            scheduler,
            reaper,
            clock: Arc::new(FixedClock::new(Self::NOW)),
            config: Arc::new(config),
        }
    }

    pub fn create_room_usecase(&self) -> CreateRoomUseCase {
        CreateRoomUseCase::new(
            self.repository.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
    }

    pub fn join_room_usecase(&self) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            self.repository.clone(),
            self.pusher.clone(),
            self.scheduler.clone(),
            self.reaper.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
    }

    pub fn send_message_usecase(&self) -> SendMessageUseCase {
        SendMessageUseCase::new(
            self.repository.clone(),
            self.pusher.clone(),
            self.scheduler.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
    }

    pub fn leave_room_usecase(&self) -> LeaveRoomUseCase {
        LeaveRoomUseCase::new(
            self.repository.clone(),
            self.pusher.clone(),
            self.reaper.clone(),
        )
    }

    pub async fn create_room(&self, initial_message: Option<&str>) -> RoomId {
        self.create_room_usecase()
            .execute(None, initial_message.map(str::to_string))
            .await
            .unwrap()
            .room_id
    }

    /// Join with connection id and username both set to `name`.
    pub async fn join(
        &self,
        room_id: &RoomId,
        name: &str,
    ) -> (JoinOutcome, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let outcome = self
            .join_room_usecase()
            .execute(
                room_id.clone(),
                ConnectionId::new(name.to_string()).unwrap(),
                Username::new(name.to_string()).unwrap(),
                tx,
            )
            .await
            .unwrap();
        (outcome, rx)
    }
}

fn fast_config() -> RelayConfig {
    RelayConfig {
        initial_message_delay: Duration::from_millis(30),
        delivered_delay: Duration::from_millis(20),
        read_delay: Duration::from_millis(60),
        reap_delay: Duration::from_millis(50),
        ..RelayConfig::default()
    }
    .with_public_url("http://relay.test")
}

/// Wait for the next event on a delivery channel.
pub(crate) async fn next_event(rx: &mut mpsc::UnboundedReceiver<String>) -> serde_json::Value {
    let payload = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed");
    serde_json::from_str(&payload).unwrap()
}

/// Take every event already queued on a delivery channel.
pub(crate) fn drain_events(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<serde_json::Value> {
    let mut events = Vec::new();
    while let Ok(payload) = rx.try_recv() {
        events.push(serde_json::from_str(&payload).unwrap());
    }
    events
}
