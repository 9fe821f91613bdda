//! 参加者へ通知するイベント（サーバー → クライアント）
//!
//! ワイヤ形式への変換は Infrastructure 層（DTO）が担当します。

use super::{
    clock::ClockSnapshot,
    outcome::GameOutcome,
    value_object::{ChessMove, SessionKey, Side},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// 待機中の参加者への状態通知
    Status(String),
    /// 手番（色）の割り当て
    RoleAssigned { side: Side, session_key: SessionKey },
    /// 対局開始
    GameStarted,
    /// 指された手
    MovePlayed(ChessMove),
    /// 指した後の局面（FEN）
    BoardState(String),
    /// 残り時間
    ClockUpdate(ClockSnapshot),
    /// 不正な手（指した本人にのみ通知）
    InvalidMove,
    /// 終局
    GameOver(GameOutcome),
}
