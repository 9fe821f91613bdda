//! 対局セッション (GameSession)
//!
//! 1 局分の状態（参加者と手番の対応、局面、対局時計、手番、ライフサイクル）を
//! 保持する集約です。状態の変更は指し手の処理（`apply_move`）と
//! 時間切れ・離脱の解決（`expire_if_flagged`, `depart`）に限られます。
//!
//! ## 状態遷移
//!
//! ```text
//! AwaitingMove(side) --合法手・時間内--> AwaitingMove(other side)
//!        |
//!        +--詰み / 引き分け / 時間切れ / 離脱--> Ended(outcome)   (以後遷移しない)
//! ```

use super::{
    clock::{ClockSnapshot, GameClock, TimeControl},
    event::ServerEvent,
    outcome::GameOutcome,
    rules::Position,
    value_object::{ChessMove, ParticipantId, SessionKey, Side, Timestamp},
};

/// セッションのライフサイクル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingMove(Side),
    Ended(GameOutcome),
}

/// 手番と参加者の対応（作成時に固定）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seats {
    pub white: ParticipantId,
    pub black: ParticipantId,
}

impl Seats {
    pub fn get(&self, side: Side) -> &ParticipantId {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    pub fn side_of(&self, participant: &ParticipantId) -> Option<Side> {
        if &self.white == participant {
            Some(Side::White)
        } else if &self.black == participant {
            Some(Side::Black)
        } else {
            None
        }
    }

    pub fn to_vec(&self) -> Vec<ParticipantId> {
        vec![self.white.clone(), self.black.clone()]
    }
}

/// 指し手が受理されなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    /// 既に終局している
    SessionEnded,
    /// 手番ではない参加者からの指し手
    WrongTurn,
    /// 合法手に含まれない、またはルールエンジンが適用を拒否した
    IllegalMove,
}

/// 受理された指し手の処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveReport {
    /// 指し手が適用された（`outcome` が `Some` なら終局）
    Played {
        mv: ChessMove,
        fen: String,
        clock: ClockSnapshot,
        outcome: Option<GameOutcome>,
    },
    /// 指す前に持ち時間が尽きていた（指し手は適用されない）
    TimedOut {
        clock: ClockSnapshot,
        outcome: GameOutcome,
    },
}

impl MoveReport {
    pub fn outcome(&self) -> Option<GameOutcome> {
        match self {
            Self::Played { outcome, .. } => *outcome,
            Self::TimedOut { outcome, .. } => Some(*outcome),
        }
    }

    /// 両参加者にブロードキャストするイベント（送信順）
    pub fn events(&self) -> Vec<ServerEvent> {
        match self {
            Self::Played {
                mv,
                fen,
                clock,
                outcome,
            } => {
                let mut events = vec![
                    ServerEvent::ClockUpdate(*clock),
                    ServerEvent::MovePlayed(*mv),
                    ServerEvent::BoardState(fen.clone()),
                ];
                if let Some(outcome) = outcome {
                    events.push(ServerEvent::GameOver(*outcome));
                }
                events
            }
            Self::TimedOut { clock, outcome } => vec![
                ServerEvent::ClockUpdate(*clock),
                ServerEvent::GameOver(*outcome),
            ],
        }
    }
}

/// 参加者の離脱による終局
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureReport {
    /// 残った（通知対象の）参加者
    pub remaining: ParticipantId,
    pub clock: ClockSnapshot,
    pub outcome: GameOutcome,
}

/// 手番側の時間切れによる終局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryReport {
    pub clock: ClockSnapshot,
    pub outcome: GameOutcome,
}

impl ExpiryReport {
    pub fn events(&self) -> Vec<ServerEvent> {
        vec![
            ServerEvent::ClockUpdate(self.clock),
            ServerEvent::GameOver(self.outcome),
        ]
    }
}

/// HTTP API などで参照するセッションの読み取り専用ビュー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub key: SessionKey,
    pub seats: Seats,
    pub side_to_move: Side,
    pub clock: ClockSnapshot,
    pub ply: u32,
    pub fen: String,
    pub created_at: Timestamp,
}

/// 対局セッション
#[derive(Debug)]
pub struct GameSession {
    key: SessionKey,
    seats: Seats,
    position: Box<dyn Position>,
    clock: GameClock,
    side_to_move: Side,
    state: SessionState,
    ply: u32,
    created_at: Timestamp,
}

impl GameSession {
    /// 新しいセッションを作成（`now` が最初のターン境界になる）
    pub fn new(
        white: ParticipantId,
        black: ParticipantId,
        position: Box<dyn Position>,
        time_control: TimeControl,
        now: Timestamp,
    ) -> Self {
        let key = SessionKey::from_pair(&white, &black);
        let side_to_move = position.turn();
        Self {
            key,
            seats: Seats { white, black },
            position,
            clock: GameClock::new(time_control, now),
            side_to_move,
            state: SessionState::AwaitingMove(side_to_move),
            ply: 0,
            created_at: now,
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn seats(&self) -> &Seats {
        &self.seats
    }

    pub fn participants(&self) -> Vec<ParticipantId> {
        self.seats.to_vec()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.state, SessionState::Ended(_))
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn fen(&self) -> String {
        self.position.to_fen()
    }

    pub fn clock_snapshot(&self) -> ClockSnapshot {
        self.clock.snapshot()
    }

    /// `participant` が現在の手番か
    pub fn is_on_move(&self, participant: &ParticipantId) -> bool {
        self.seats.get(self.position.turn()) == participant
    }

    /// 手番側の残り時間（前回のターン境界時点）
    pub fn remaining_for_side_to_move(&self) -> i64 {
        self.clock.remaining(self.side_to_move)
    }

    /// 指し手を処理する
    ///
    /// 1. 手番の参加者か（ルールエンジンの手番で判定）
    /// 2. 合法手に含まれるか
    /// 3. ルールエンジンで適用後の局面を計算（失敗時は何も変更しない）
    /// 4. 対局時計を更新し、時間切れなら指し手を捨てて終局
    /// 5. 局面・手番を確定し、終局判定
    pub fn apply_move(
        &mut self,
        actor: &ParticipantId,
        mv: &ChessMove,
        now: Timestamp,
    ) -> Result<MoveReport, MoveRejection> {
        if self.is_ended() {
            return Err(MoveRejection::SessionEnded);
        }

        if !self.is_on_move(actor) {
            return Err(MoveRejection::WrongTurn);
        }
        let turn = self.position.turn();

        let legal = self
            .position
            .legal_moves()
            .into_iter()
            .find(|legal| legal.matches(mv))
            .ok_or(MoveRejection::IllegalMove)?;
        let next = self
            .position
            .play(&legal.to_chess_move())
            .map_err(|_| MoveRejection::IllegalMove)?;

        let clock = self.clock.tick(turn, now);
        if self.clock.is_flagged(turn) {
            let outcome = GameOutcome::timeout(turn);
            self.state = SessionState::Ended(outcome);
            return Ok(MoveReport::TimedOut { clock, outcome });
        }

        self.position = next;
        self.side_to_move = self.position.turn();
        self.ply += 1;

        let outcome = if self.position.is_terminal() {
            Some(if self.position.is_checkmate() {
                GameOutcome::checkmate(self.side_to_move.opposite())
            } else {
                GameOutcome::draw()
            })
        } else {
            None
        };
        self.state = match outcome {
            Some(outcome) => SessionState::Ended(outcome),
            None => SessionState::AwaitingMove(self.side_to_move),
        };

        Ok(MoveReport::Played {
            mv: *mv,
            fen: self.position.to_fen(),
            clock,
            outcome,
        })
    }

    /// 手番側が時間切れなら終局させる
    pub fn expire_if_flagged(&mut self, now: Timestamp) -> Option<ExpiryReport> {
        if self.is_ended() {
            return None;
        }

        let turn = self.position.turn();
        let clock = self.clock.tick(turn, now);
        if !self.clock.is_flagged(turn) {
            return None;
        }

        let outcome = GameOutcome::timeout(turn);
        self.state = SessionState::Ended(outcome);
        Some(ExpiryReport { clock, outcome })
    }

    /// 参加者の離脱を処理する
    ///
    /// 離脱の時点で手番側が時間切れになっていれば時間切れ、そうでなければ
    /// 離脱した側の負けとして終局します。既に終局している場合、または
    /// セッションの参加者でない場合は `None`。
    pub fn depart(&mut self, participant: &ParticipantId, now: Timestamp) -> Option<DepartureReport> {
        if self.is_ended() {
            return None;
        }
        let departed = self.seats.side_of(participant)?;

        let turn = self.position.turn();
        let clock = self.clock.tick(turn, now);
        let outcome = if self.clock.is_flagged(turn) {
            GameOutcome::timeout(turn)
        } else {
            GameOutcome::opponent_departed(departed)
        };
        self.state = SessionState::Ended(outcome);

        Some(DepartureReport {
            remaining: self.seats.get(departed.opposite()).clone(),
            clock,
            outcome,
        })
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            key: self.key.clone(),
            seats: self.seats.clone(),
            side_to_move: self.side_to_move,
            clock: self.clock.snapshot(),
            ply: self.ply,
            fen: self.position.to_fen(),
            created_at: self.created_at,
        }
    }
}
