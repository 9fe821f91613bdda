//! UseCase: 参加者接続処理（マッチメイク）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 待機スロットへの登録と、2 人目の接続によるペア成立
//!
//! ### なぜこのテストが必要か
//! - 先着が白・後着が黒になること、手番の割り当てが各自に届くことを保証
//! - 同じ参加者の重複接続を防ぐ
//!
//! ### どのような状況を想定しているか
//! - 正常系：1 人目は待機、2 人目でペア成立
//! - 正常系：3 人目は新たに待機する
//! - 異常系：待機中の参加者の重複接続

use std::sync::Arc;

use taikyoku_shared::time::WallClock;

use crate::domain::{
    GameSession, MessagePusher, Pairing, ParticipantId, PusherChannel, RulesEngine,
    ServerEvent, SessionBuilder, SessionKey, SessionRepository, Side, TimeControl, Timestamp,
};

use super::{error::ConnectError, turn_timer::TurnTimer};

/// 待機中の参加者に送るメッセージ
pub const SEARCHING_STATUS: &str = "Searching for opponent...";

/// 接続の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// 待機スロットに入った
    Waiting,
    /// ペアが成立し、セッションが開始された
    Paired {
        session_key: SessionKey,
        white: ParticipantId,
        black: ParticipantId,
    },
}

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    rules: Arc<dyn RulesEngine>,
    clock: Arc<dyn WallClock>,
    turn_timer: Arc<TurnTimer>,
    time_control: TimeControl,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        rules: Arc<dyn RulesEngine>,
        clock: Arc<dyn WallClock>,
        turn_timer: Arc<TurnTimer>,
        time_control: TimeControl,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            rules,
            clock,
            turn_timer,
            time_control,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Arguments
    ///
    /// * `participant` - 接続した参加者の ID
    /// * `sender` - 参加者へのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectOutcome)` - 待機、またはペア成立
    /// * `Err(ConnectError)` - 既に待機中・対局中の参加者
    pub async fn execute(
        &self,
        participant: ParticipantId,
        sender: PusherChannel,
    ) -> Result<ConnectOutcome, ConnectError> {
        // 1. 重複チェック
        if self.repository.is_engaged(&participant).await {
            return Err(ConnectError::AlreadyEngaged(participant.into_string()));
        }

        // 2. MessagePusher に送信チャネルを登録
        self.message_pusher
            .register_client(participant.clone(), sender)
            .await;

        // 3. 待機 or ペア成立（セッション作成）
        let pairing = self
            .repository
            .pair_or_wait(participant.clone(), self.session_builder())
            .await
            .map_err(|_| ConnectError::AlreadyEngaged(participant.as_str().to_string()))?;

        match pairing {
            Pairing::Waiting => {
                tracing::info!("Participant '{}' is waiting for an opponent", participant);
                self.push_or_log(
                    &participant,
                    &ServerEvent::Status(SEARCHING_STATUS.to_string()),
                )
                .await;
                Ok(ConnectOutcome::Waiting)
            }
            Pairing::Paired(handle) => {
                let session = handle.lock().await;
                let session_key = session.key().clone();
                let seats = session.seats().clone();
                tracing::info!(
                    "Session '{}' started (white: '{}', black: '{}')",
                    session_key,
                    seats.white,
                    seats.black
                );

                // 4. 手番の割り当ては各自に、対局開始は両者に通知
                for side in [Side::White, Side::Black] {
                    let event = ServerEvent::RoleAssigned {
                        side,
                        session_key: session_key.clone(),
                    };
                    self.push_or_log(seats.get(side), &event).await;
                }
                if let Err(e) = self
                    .message_pusher
                    .broadcast(&seats.to_vec(), &ServerEvent::GameStarted)
                    .await
                {
                    tracing::warn!("Failed to broadcast game start of '{}': {}", session_key, e);
                }

                let remaining = session.remaining_for_side_to_move();
                self.turn_timer.arm(session_key.clone(), session.ply(), remaining);
                drop(session);

                Ok(ConnectOutcome::Paired {
                    session_key,
                    white: seats.white,
                    black: seats.black,
                })
            }
        }
    }

    /// ペア成立時のセッション生成（開始時刻は接続時刻）
    fn session_builder(&self) -> SessionBuilder {
        let rules = Arc::clone(&self.rules);
        let time_control = self.time_control;
        let started_at = Timestamp::new(self.clock.now_millis());
        Box::new(move |white, black| {
            GameSession::new(
                white,
                black,
                rules.initial_position(),
                time_control,
                started_at,
            )
        })
    }

    async fn push_or_log(&self, participant: &ParticipantId, event: &ServerEvent) {
        if let Err(e) = self.message_pusher.push_to(participant, event).await {
            tracing::warn!("Failed to push to '{}': {}", participant, e);
        }
    }
}
