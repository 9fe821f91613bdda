//! 手番タイマー（時間切れの能動的な検出）
//!
//! 無効時（既定）は何もしません。時間切れは次の指し手・切断の時点で
//! 遅延評価されます。
//!
//! 有効時はセッションごとに 1 つの tokio タスクを持ち、手番側の持ち時間が
//! 尽きる時刻に起床します。起床時はセッションをロックして再検証し、
//! 終局済み・手が進んでいる（ply が変わった）場合は何もしません。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use taikyoku_shared::time::WallClock;
use tokio::task::AbortHandle;

use crate::domain::{MessagePusher, SessionKey, SessionRepository, Timestamp};

struct ArmedTimer {
    generation: u64,
    /// arm した時点の手数
    ply: u32,
    handle: AbortHandle,
}

#[derive(Default)]
struct TimerTable {
    next_generation: u64,
    armed: HashMap<SessionKey, ArmedTimer>,
}

pub struct TurnTimer {
    enabled: bool,
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn WallClock>,
    timers: Mutex<TimerTable>,
}

impl TurnTimer {
    pub fn new(
        enabled: bool,
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn WallClock>,
    ) -> Self {
        Self {
            enabled,
            repository,
            message_pusher,
            clock,
            timers: Mutex::new(TimerTable::default()),
        }
    }

    /// 遅延評価のみのタイマー（arm / cancel は何もしない）
    pub fn disabled(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn WallClock>,
    ) -> Self {
        Self::new(false, repository, message_pusher, clock)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 現在 arm されているタイマーの数
    pub fn armed_count(&self) -> usize {
        self.timers.lock().map(|t| t.armed.len()).unwrap_or(0)
    }

    /// `remaining_millis` 後に起床するタイマーを arm する（既存のタイマーは破棄）
    ///
    /// `ply` は arm した時点の手数。起床時に手数が変わっていれば何もしない。
    /// より新しい手数で arm 済みのタイマーは置き換えない。
    pub fn arm(self: &Arc<Self>, key: SessionKey, ply: u32, remaining_millis: i64) {
        if !self.enabled {
            return;
        }
        let Ok(mut timers) = self.timers.lock() else {
            tracing::error!("Turn timer table is poisoned; session '{}' not armed", key);
            return;
        };
        if let Some(armed) = timers.armed.get(&key)
            && armed.ply > ply
        {
            tracing::debug!(
                "Ignoring stale arm for '{}' (ply {} < armed ply {})",
                key,
                ply,
                armed.ply
            );
            return;
        }

        let generation = timers.next_generation;
        timers.next_generation += 1;

        let delay = Duration::from_millis(u64::try_from(remaining_millis).unwrap_or(0));
        let timer = Arc::clone(self);
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            timer.fire(task_key, ply, generation).await;
        });

        let armed = ArmedTimer {
            generation,
            ply,
            handle: task.abort_handle(),
        };
        if let Some(previous) = timers.armed.insert(key.clone(), armed) {
            previous.handle.abort();
        }
        tracing::debug!("Turn timer armed for '{}' ({:?}, ply {})", key, delay, ply);
    }

    /// セッションのタイマーを破棄する（冪等）
    pub fn cancel(&self, key: &SessionKey) {
        if !self.enabled {
            return;
        }
        if let Ok(mut timers) = self.timers.lock()
            && let Some(previous) = timers.armed.remove(key)
        {
            previous.handle.abort();
            tracing::debug!("Turn timer cancelled for '{}'", key);
        }
    }

    /// 自分が最新のタイマーならテーブルから外す（古いタイマーなら false）
    fn claim(&self, key: &SessionKey, generation: u64) -> bool {
        let Ok(mut timers) = self.timers.lock() else {
            return false;
        };
        match timers.armed.get(key) {
            Some(armed) if armed.generation == generation => {
                timers.armed.remove(key);
                true
            }
            _ => false,
        }
    }

    async fn fire(self: Arc<Self>, key: SessionKey, ply: u32, generation: u64) {
        if !self.claim(&key, generation) {
            return;
        }
        let Some(handle) = self.repository.find_session(&key).await else {
            return;
        };

        let mut session = handle.lock().await;
        if session.is_ended() || session.ply() != ply {
            return;
        }

        let now = Timestamp::new(self.clock.now_millis());
        let Some(report) = session.expire_if_flagged(now) else {
            // まだ持ち時間が残っている（壁時計とタイマーのずれ）
            let remaining = session.remaining_for_side_to_move();
            self.arm(key, ply, remaining);
            return;
        };

        tracing::info!("Session '{}' ended by flag fall: {:?}", key, report.outcome);
        let participants = session.participants();
        for event in report.events() {
            if let Err(e) = self.message_pusher.broadcast(&participants, &event).await {
                tracing::warn!("Failed to broadcast timeout of '{}': {}", key, e);
            }
        }
        drop(session);

        self.repository.remove_session(&key).await;
    }
}
