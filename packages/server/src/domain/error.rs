//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクト生成時のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("participant id must not be empty")]
    ParticipantIdEmpty,

    #[error("participant id is too long ({0} chars)")]
    ParticipantIdTooLong(usize),

    #[error("participant id contains invalid characters: '{0}'")]
    ParticipantIdInvalidChars(String),

    #[error("malformed session key: '{0}'")]
    SessionKeyMalformed(String),

    #[error("invalid square: '{0}'")]
    InvalidSquare(String),

    #[error("invalid promotion piece: '{0}'")]
    InvalidPromotion(String),
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// 既に待機中、または対局中の参加者
    #[error("participant '{0}' is already waiting or seated")]
    ParticipantAlreadyEngaged(String),
}

/// メッセージ送信（通知）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// ルールエンジン境界のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("move cannot be interpreted in this position: {0}")]
    InvalidMove(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),
}
