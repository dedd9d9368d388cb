//! Server state and dependency wiring.

use std::sync::Arc;

use bisik_shared::time::{Clock, SystemClock};

use crate::{
    config::RelayConfig,
    domain::MessagePusher,
    infrastructure::{
        message_pusher::ChannelMessagePusher, repository::InMemoryRoomRepository,
        scheduler::TaskScheduler,
    },
    usecase::{
        CreateRoomUseCase, GetRoomInfoUseCase, IdleRoomReaper, JoinRoomUseCase, LeaveRoomUseCase,
        SendMessageUseCase, TypingUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// GetRoomInfoUseCase（ルーム情報取得のユースケース）
    pub get_room_info_usecase: Arc<GetRoomInfoUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（退出・切断のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// TypingUseCase（入力中通知のユースケース）
    pub typing_usecase: Arc<TypingUseCase>,
    /// MessagePusher（リクエスト失敗を送信元へ返すために使用）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// 遅延タスク（シャットダウン時に全て中断する）
    pub scheduler: Arc<TaskScheduler>,
}

impl AppState {
    /// Wire the relay on top of the in-memory registry and channel pusher.
    pub fn in_memory(config: RelayConfig) -> Self {
        // Initialize dependencies in order:
        // 1. Repository / MessagePusher / Scheduler
        // 2. Reaper
        // 3. UseCases
        let config = Arc::new(config);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // 1. Infrastructure
        let repository = Arc::new(InMemoryRoomRepository::new());
        let message_pusher = Arc::new(ChannelMessagePusher::new());
        let scheduler = Arc::new(TaskScheduler::new());

        // 2. Reaper
        let reaper = Arc::new(IdleRoomReaper::new(
            repository.clone(),
            scheduler.clone(),
            config.reap_delay,
        ));

        // 3. UseCases
        Self {
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                repository.clone(),
                clock.clone(),
                config.clone(),
            )),
            get_room_info_usecase: Arc::new(GetRoomInfoUseCase::new(repository.clone())),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                scheduler.clone(),
                reaper.clone(),
                clock.clone(),
                config.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                reaper,
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                scheduler.clone(),
                clock,
                config,
            )),
            typing_usecase: Arc::new(TypingUseCase::new(repository, message_pusher.clone())),
            message_pusher,
            scheduler,
        }
    }
}
