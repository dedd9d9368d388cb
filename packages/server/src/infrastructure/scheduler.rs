//! Keyed, cancellable deferred tasks.
//!
//! Every timer the relay arms (status updates, initial messages, idle-room
//! reaping) goes through [`TaskScheduler`]. A key identifies at most one
//! pending task: scheduling an existing key aborts the earlier task first.

use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::task::AbortHandle;

use crate::domain::{MessageId, MessageStatus, RoomId};

/// Identity of a scheduled task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskKey {
    Reap(RoomId),
    StatusUpdate(RoomId, MessageId, MessageStatus),
    InitialMessage(RoomId),
}

struct ScheduledTask {
    id: u64,
    handle: AbortHandle,
}

type TaskMap = HashMap<TaskKey, ScheduledTask>;

#[derive(Default)]
pub struct TaskScheduler {
    tasks: Arc<Mutex<TaskMap>>,
    next_id: AtomicU64,
}

fn lock(tasks: &Mutex<TaskMap>) -> MutexGuard<'_, TaskMap> {
    tasks.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay`. Replaces any pending task with the same key.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: TaskKey, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);
        let task_key = key.clone();

        // The map stays locked until the entry is inserted, so a task that
        // finishes immediately still finds (and removes) its own entry.
        let mut pending = lock(&self.tasks);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
            let mut pending = lock(&tasks);
            if pending.get(&task_key).is_some_and(|t| t.id == id) {
                pending.remove(&task_key);
            }
        })
        .abort_handle();

        if let Some(previous) = pending.insert(key, ScheduledTask { id, handle }) {
            previous.handle.abort();
        }
    }

    /// Abort a pending task. Returns `true` if one was pending.
    pub fn cancel(&self, key: &TaskKey) -> bool {
        match lock(&self.tasks).remove(key) {
            Some(task) => {
                task.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, key: &TaskKey) -> bool {
        lock(&self.tasks).contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.tasks).len()
    }

    /// Abort every pending task. Called on process shutdown.
    pub fn shutdown(&self) {
        let drained: Vec<ScheduledTask> = lock(&self.tasks).drain().map(|(_, t)| t).collect();
        if !drained.is_empty() {
            tracing::info!("Aborting {} pending task(s)", drained.len());
        }
        for task in drained {
            task.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoomIdFactory;
    use std::sync::atomic::AtomicUsize;

    fn counter_task(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_task_runs_after_delay_and_is_forgotten() {
        // テスト項目: 遅延後にタスクが実行され、完了後は保留リストから消える
        // given (前提条件):
        let scheduler = TaskScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = TaskKey::Reap(RoomIdFactory::generate());

        // when (操作):
        scheduler.schedule(key.clone(), Duration::from_millis(20), counter_task(&counter));
        let pending_before = scheduler.is_pending(&key);
        tokio::time::sleep(Duration::from_millis(100)).await;

        // then (期待する結果):
        assert!(pending_before);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending(&key));
    }

    #[tokio::test]
    async fn test_rescheduling_same_key_does_not_compound() {
        // テスト項目: 同じキーで再スケジュールすると前のタスクは破棄される
        // given (前提条件):
        let scheduler = TaskScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = TaskKey::Reap(RoomIdFactory::generate());

        // when (操作):
        for _ in 0..5 {
            scheduler.schedule(key.clone(), Duration::from_millis(30), counter_task(&counter));
        }
        tokio::time::sleep(Duration::from_millis(120)).await;

        // then (期待する結果):
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_prevents_execution() {
        // テスト項目: キャンセルしたタスクは実行されない
        // given (前提条件):
        let scheduler = TaskScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = TaskKey::InitialMessage(RoomIdFactory::generate());
        scheduler.schedule(key.clone(), Duration::from_millis(30), counter_task(&counter));

        // when (操作):
        let cancelled = scheduler.cancel(&key);
        tokio::time::sleep(Duration::from_millis(80)).await;

        // then (期待する結果):
        assert!(cancelled);
        assert!(!scheduler.cancel(&key));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_run_independently() {
        // テスト項目: 異なるキーのタスクはそれぞれ実行される
        // given (前提条件):
        let scheduler = TaskScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let room_id = RoomIdFactory::generate();
        let message_id = MessageId::new("m1".to_string()).unwrap();

        // when (操作):
        scheduler.schedule(
            TaskKey::StatusUpdate(room_id.clone(), message_id.clone(), MessageStatus::Delivered),
            Duration::from_millis(10),
            counter_task(&counter),
        );
        scheduler.schedule(
            TaskKey::StatusUpdate(room_id, message_id, MessageStatus::Read),
            Duration::from_millis(20),
            counter_task(&counter),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;

        // then (期待する結果):
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shutdown_aborts_everything() {
        // テスト項目: shutdown で保留中のタスクがすべて破棄される
        // given (前提条件):
        let scheduler = TaskScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            scheduler.schedule(
                TaskKey::Reap(RoomIdFactory::generate()),
                Duration::from_millis(30),
                counter_task(&counter),
            );
        }

        // when (操作):
        scheduler.shutdown();
        tokio::time::sleep(Duration::from_millis(80)).await;

        // then (期待する結果):
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
