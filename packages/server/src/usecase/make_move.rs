//! UseCase: 指し手処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - MakeMoveUseCase::execute() メソッド
//! - 手番・合法性の検証、両者へのブロードキャスト、終局時のセッション削除
//!
//! ### なぜこのテストが必要か
//! - 不正な手は指した本人にのみ通知され、状態が変化しないことを保証
//! - 終局した瞬間にセッションが Registry から消えることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：合法手のブロードキャスト
//! - 正常系：詰みによる終局
//! - 異常系：手番違い、非合法手、未知のセッション
//! - エッジケース：持ち時間切れ後の指し手

use std::sync::Arc;

use taikyoku_shared::time::WallClock;

use crate::domain::{
    ChessMove, GameOutcome, MessagePusher, MoveRejection, ParticipantId, ServerEvent, SessionKey,
    SessionRepository, Timestamp,
};

use super::{error::MoveError, turn_timer::TurnTimer};

/// クライアントから届いた指し手要求（未検証）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCommand {
    pub session_key: String,
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
}

/// 受理された指し手の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// 指し手が適用され、対局は続く
    Accepted,
    /// 終局した（時間切れで指し手が適用されなかった場合を含む）
    Terminal(GameOutcome),
}

/// 指し手処理のユースケース
pub struct MakeMoveUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn WallClock>,
    turn_timer: Arc<TurnTimer>,
}

impl MakeMoveUseCase {
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

    /// 指し手処理を実行
    ///
    /// # Returns
    ///
    /// * `Ok(MoveOutcome)` - 受理（継続 or 終局）
    /// * `Err(MoveError::WrongTurn | IllegalMove)` - 指した本人に `invalid_move` を通知済み
    /// * `Err(MoveError::UnknownSession)` - 何もしない
    pub async fn execute(
        &self,
        actor: &ParticipantId,
        command: MoveCommand,
    ) -> Result<MoveOutcome, MoveError> {
        // 1. セッションの特定
        let key =
            SessionKey::new(command.session_key).map_err(|_| MoveError::UnknownSession)?;
        let handle = self
            .repository
            .find_session(&key)
            .await
            .ok_or(MoveError::UnknownSession)?;

        // 2. セッションのロック中に検証・適用・通知まで行う
        let mut session = handle.lock().await;
        let now = Timestamp::new(self.clock.now_millis());
        let report = ChessMove::parse(&command.from, &command.to, command.promotion.as_deref())
            .map_err(|_| {
                if session.is_on_move(actor) {
                    MoveRejection::IllegalMove
                } else {
                    MoveRejection::WrongTurn
                }
            })
            .and_then(|mv| session.apply_move(actor, &mv, now));

        let report = match report {
            Ok(report) => report,
            Err(MoveRejection::SessionEnded) => return Err(MoveError::UnknownSession),
            Err(rejection) => {
                tracing::debug!(
                    "Move by '{}' in '{}' rejected: {:?}",
                    actor,
                    key,
                    rejection
                );
                if let Err(e) = self
                    .message_pusher
                    .push_to(actor, &ServerEvent::InvalidMove)
                    .await
                {
                    tracing::warn!("Failed to push invalid_move to '{}': {}", actor, e);
                }
                return Err(match rejection {
                    MoveRejection::WrongTurn => MoveError::WrongTurn,
                    _ => MoveError::IllegalMove,
                });
            }
        };

        let participants = session.participants();
        for event in report.events() {
            if let Err(e) = self.message_pusher.broadcast(&participants, &event).await {
                tracing::warn!("Failed to broadcast to session '{}': {}", key, e);
            }
        }

        // 3. 終局ならセッションを削除、継続ならロック中にタイマーを再設定
        match report.outcome() {
            Some(outcome) => {
                drop(session);
                tracing::info!("Session '{}' ended: {:?}", key, outcome);
                self.turn_timer.cancel(&key);
                self.repository.remove_session(&key).await;
                Ok(MoveOutcome::Terminal(outcome))
            }
            None => {
                let remaining = session.remaining_for_side_to_move();
                self.turn_timer.arm(key, session.ply(), remaining);
                Ok(MoveOutcome::Accepted)
            }
        }
    }
}
