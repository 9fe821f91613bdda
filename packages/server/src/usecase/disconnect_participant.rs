//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 待機スロットからの離脱、対局中の離脱による終局
//!
//! ### なぜこのテストが必要か
//! - 残った参加者にのみ終局が通知され、セッションが削除されることを保証
//! - 2 回目の切断が何もしないこと（冪等性）を保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：待機中の離脱、対局中の離脱
//! - エッジケース：手番側が時間切れの状態での離脱（時間切れとして扱う）
//! - エッジケース：相手が既に切断済みで通知できない
//! - 並行：詰みの一手と切断が同時に届く（終局は一度だけ）

use std::sync::Arc;

use taikyoku_shared::time::WallClock;

use crate::domain::{
    EndReason, GameOutcome, MessagePusher, ParticipantId, ServerEvent, SessionKey,
    SessionRepository, Timestamp,
};

use super::turn_timer::TurnTimer;

/// 切断の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// 待機スロットから離脱した
    LeftQueue,
    /// 対局中のセッションが終局・削除された
    SessionClosed {
        session_key: SessionKey,
        outcome: GameOutcome,
    },
    /// 何もしなかった（既に処理済み、または未参加）
    NoOp,
}

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn WallClock>,
    turn_timer: Arc<TurnTimer>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn WallClock>,
        turn_timer: Arc<TurnTimer>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
            turn_timer,
        }
    }

    /// 参加者切断を実行
    pub async fn execute(&self, participant: &ParticipantId) -> DisconnectOutcome {
        // 1. 送信チャネルの登録解除
        self.message_pusher.unregister_client(participant).await;

        // 2. 待機中ならスロットを空けて終了
        if self.repository.leave_waiting(participant).await {
            tracing::info!("Participant '{}' left the waiting slot", participant);
            return DisconnectOutcome::LeftQueue;
        }

        // 3. 対局中なら離脱として終局
        let Some(handle) = self
            .repository
            .find_session_by_participant(participant)
            .await
        else {
            return DisconnectOutcome::NoOp;
        };

        let mut session = handle.lock().await;
        let now = Timestamp::new(self.clock.now_millis());
        let Some(report) = session.depart(participant, now) else {
            return DisconnectOutcome::NoOp;
        };
        let session_key = session.key().clone();

        if report.outcome.reason == EndReason::Timeout {
            self.push_or_log(&report.remaining, &ServerEvent::ClockUpdate(report.clock))
                .await;
        }
        self.push_or_log(&report.remaining, &ServerEvent::GameOver(report.outcome))
            .await;
        drop(session);

        tracing::info!(
            "Session '{}' ended by departure of '{}': {:?}",
            session_key,
            participant,
            report.outcome
        );
        self.turn_timer.cancel(&session_key);
        self.repository.remove_session(&session_key).await;

        DisconnectOutcome::SessionClosed {
            session_key,
            outcome: report.outcome,
        }
    }

    /// 相手が既に切断済みの場合の送信失敗は無視する
    async fn push_or_log(&self, participant: &ParticipantId, event: &ServerEvent) {
        if let Err(e) = self.message_pusher.push_to(participant, event).await {
            tracing::debug!("Could not notify '{}': {}", participant, e);
        }
    }
}
