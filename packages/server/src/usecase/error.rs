//! UseCase 層のエラー型

use thiserror::Error;

/// 参加者接続のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("participant '{0}' is already waiting or seated")]
    AlreadyEngaged(String),
}

/// 指し手処理のエラー
///
/// `WrongTurn` / `IllegalMove` は指した本人に `invalid_move` を通知済み。
/// `UnknownSession` は何も通知しない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("not this participant's turn")]
    WrongTurn,

    #[error("illegal move")]
    IllegalMove,

    #[error("unknown or finished session")]
    UnknownSession,
}

/// セッション詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetSessionDetailError {
    #[error("session not found")]
    SessionNotFound,
}
