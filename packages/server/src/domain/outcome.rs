//! 終局結果

use super::value_object::Side;

/// 勝敗
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win(Side),
    Draw,
}

/// 終局理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Checkmate,
    Draw,
    Timeout,
    OpponentDeparted,
}

impl EndReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkmate => "checkmate",
            Self::Draw => "draw",
            Self::Timeout => "timeout",
            Self::OpponentDeparted => "opponent_departed",
        }
    }
}

/// 終局結果（勝敗 + 理由）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub result: GameResult,
    pub reason: EndReason,
}

impl GameOutcome {
    pub fn checkmate(winner: Side) -> Self {
        Self {
            result: GameResult::Win(winner),
            reason: EndReason::Checkmate,
        }
    }

    pub fn draw() -> Self {
        Self {
            result: GameResult::Draw,
            reason: EndReason::Draw,
        }
    }

    /// `flagged` の時間切れ負け
    pub fn timeout(flagged: Side) -> Self {
        Self {
            result: GameResult::Win(flagged.opposite()),
            reason: EndReason::Timeout,
        }
    }

    /// `departed` の離脱による負け
    pub fn opponent_departed(departed: Side) -> Self {
        Self {
            result: GameResult::Win(departed.opposite()),
            reason: EndReason::OpponentDeparted,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self.result {
            GameResult::Win(side) => Some(side),
            GameResult::Draw => None,
        }
    }
}
