//! 値オブジェクト (Value Object)
//!
//! 生成時にバリデーションを行い、不正な値を持つインスタンスが存在しないことを保証します。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

const PARTICIPANT_ID_MAX_LEN: usize = 64;

/// セッションキー内で 2 人の参加者 ID を区切る文字（ParticipantId には使えない）
const SESSION_KEY_SEPARATOR: char = ':';

// ========================================
// ParticipantId
// ========================================

/// 参加者（接続）を識別する ID
///
/// 使用可能な文字は ASCII 英数字、`-`、`_` のみ。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// 新しい ParticipantId を作成
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::ParticipantIdEmpty);
        }
        if value.len() > PARTICIPANT_ID_MAX_LEN {
            return Err(ValueObjectError::ParticipantIdTooLong(value.len()));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValueObjectError::ParticipantIdInvalidChars(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ParticipantId の生成器（接続ごとに UUID v4 を払い出す）
pub struct ParticipantIdFactory;

impl ParticipantIdFactory {
    pub fn generate() -> ParticipantId {
        // UUID の文字列表現は常に ParticipantId の制約を満たす
        ParticipantId(Uuid::new_v4().to_string())
    }
}

// ========================================
// SessionKey
// ========================================

/// 対局セッションのキー
///
/// 2 人の参加者 ID から決定的に導出される（`{white}:{black}`）。
/// 区切り文字 `:` は ParticipantId に含まれないため、衝突しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey(String);

impl SessionKey {
    /// 白番・黒番の参加者 ID からキーを導出
    pub fn from_pair(white: &ParticipantId, black: &ParticipantId) -> Self {
        Self(format!(
            "{}{}{}",
            white.as_str(),
            SESSION_KEY_SEPARATOR,
            black.as_str()
        ))
    }

    /// クライアントから受け取った文字列をキーとして解釈
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        match value.split_once(SESSION_KEY_SEPARATOR) {
            Some((white, black)) => {
                let white = ParticipantId::new(white.to_string())
                    .map_err(|_| ValueObjectError::SessionKeyMalformed(value.clone()))?;
                let black = ParticipantId::new(black.to_string())
                    .map_err(|_| ValueObjectError::SessionKeyMalformed(value.clone()))?;
                Ok(Self::from_pair(&white, &black))
            }
            None => Err(ValueObjectError::SessionKeyMalformed(value)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SessionKey {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ========================================
// Side
// ========================================

/// 手番（先手 = 白、後手 = 黒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// 先手（最初に指す側）
    #[serde(rename = "w")]
    White,
    /// 後手
    #[serde(rename = "b")]
    Black,
}

impl Side {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// ワイヤ上の表記（"w" / "b"）
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::White => "w",
            Self::Black => "b",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ========================================
// Square / PromotionPiece / ChessMove
// ========================================

/// 盤上のマス（"a1" 〜 "h8"）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn new(value: &str) -> Result<Self, ValueObjectError> {
        match value.as_bytes() {
            [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Ok(Self {
                file: file - b'a',
                rank: rank - b'1',
            }),
            _ => Err(ValueObjectError::InvalidSquare(value.to_string())),
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, (b'1' + self.rank) as char)
    }
}

/// 成り駒の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionPiece {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionPiece {
    pub fn new(value: &str) -> Result<Self, ValueObjectError> {
        match value {
            "q" | "Q" => Ok(Self::Queen),
            "r" | "R" => Ok(Self::Rook),
            "b" | "B" => Ok(Self::Bishop),
            "n" | "N" => Ok(Self::Knight),
            _ => Err(ValueObjectError::InvalidPromotion(value.to_string())),
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
        }
    }
}

/// 指し手（移動元・移動先・成り駒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PromotionPiece>,
}

impl ChessMove {
    pub fn new(from: Square, to: Square, promotion: Option<PromotionPiece>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }

    /// クライアントから受け取った生の文字列から指し手を組み立てる
    pub fn parse(from: &str, to: &str, promotion: Option<&str>) -> Result<Self, ValueObjectError> {
        let promotion = match promotion {
            Some(p) if !p.is_empty() => Some(PromotionPiece::new(p)?),
            _ => None,
        };
        Ok(Self::new(Square::new(from)?, Square::new(to)?, promotion))
    }

    /// UCI 表記（例: "e2e4", "a7a8q"）
    pub fn to_uci(&self) -> String {
        match self.promotion {
            Some(piece) => format!("{}{}{}", self.from, self.to, piece.as_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

// ========================================
// Timestamp
// ========================================

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_id_accepts_uuid_like_value() {
        // テスト項目: UUID 形式の ID は受け入れられる
        // given (前提条件):
        let value = "9b2f7c1e-3d4a-4b5c-8d6e-7f8091a2b3c4".to_string();

        // when (操作):
        let result = ParticipantId::new(value.clone());

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), value);
    }

    #[test]
    fn test_participant_id_rejects_empty_and_separator() {
        // テスト項目: 空文字列と区切り文字を含む ID は拒否される
        // given (前提条件):
        let empty = String::new();
        let with_separator = "alice:bob".to_string();

        // when (操作):
        let empty_result = ParticipantId::new(empty);
        let separator_result = ParticipantId::new(with_separator);

        // then (期待する結果):
        assert_eq!(empty_result, Err(ValueObjectError::ParticipantIdEmpty));
        assert!(matches!(
            separator_result,
            Err(ValueObjectError::ParticipantIdInvalidChars(_))
        ));
    }

    #[test]
    fn test_participant_id_rejects_too_long_value() {
        // テスト項目: 64 文字を超える ID は拒否される
        // given (前提条件):
        let value = "a".repeat(65);

        // when (操作):
        let result = ParticipantId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::ParticipantIdTooLong(65)));
    }

    #[test]
    fn test_generated_participant_ids_are_unique() {
        // テスト項目: 生成された ParticipantId は毎回異なる
        // given (前提条件):

        // when (操作):
        let first = ParticipantIdFactory::generate();
        let second = ParticipantIdFactory::generate();

        // then (期待する結果):
        assert_ne!(first, second);
        assert!(ParticipantId::new(first.into_string()).is_ok());
    }

    #[test]
    fn test_session_key_is_derived_deterministically() {
        // テスト項目: 同じペアからは同じキー、順序が違えば異なるキーが導出される
        // given (前提条件):
        let alice = ParticipantId::new("alice".to_string()).unwrap();
        let bob = ParticipantId::new("bob".to_string()).unwrap();

        // when (操作):
        let key1 = SessionKey::from_pair(&alice, &bob);
        let key2 = SessionKey::from_pair(&alice, &bob);
        let swapped = SessionKey::from_pair(&bob, &alice);

        // then (期待する結果):
        assert_eq!(key1, key2);
        assert_eq!(key1.as_str(), "alice:bob");
        assert_ne!(key1, swapped);
    }

    #[test]
    fn test_session_key_does_not_collide_on_dashes() {
        // テスト項目: 単純連結では衝突するペアでもキーは異なる
        // given (前提条件):
        let a_b = ParticipantId::new("a-b".to_string()).unwrap();
        let c = ParticipantId::new("c".to_string()).unwrap();
        let a = ParticipantId::new("a".to_string()).unwrap();
        let b_c = ParticipantId::new("b-c".to_string()).unwrap();

        // when (操作):
        let key1 = SessionKey::from_pair(&a_b, &c);
        let key2 = SessionKey::from_pair(&a, &b_c);

        // then (期待する結果):
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_session_key_parse() {
        // テスト項目: 文字列からのキー解釈（正常・異常）
        // given (前提条件):
        let valid = "alice:bob".to_string();
        let invalid = "no-separator".to_string();

        // when (操作):
        let parsed = SessionKey::new(valid);
        let rejected = SessionKey::new(invalid);

        // then (期待する結果):
        assert_eq!(parsed.unwrap().as_str(), "alice:bob");
        assert!(matches!(
            rejected,
            Err(ValueObjectError::SessionKeyMalformed(_))
        ));
    }

    #[test]
    fn test_square_parse_and_display() {
        // テスト項目: マス目の解釈と表示が一致し、盤外は拒否される
        // given (前提条件):

        // when (操作):
        let e4 = Square::new("e4");
        let off_board = Square::new("i9");
        let too_long = Square::new("e44");

        // then (期待する結果):
        assert_eq!(e4.unwrap().to_string(), "e4");
        assert!(off_board.is_err());
        assert!(too_long.is_err());
    }

    #[test]
    fn test_chess_move_parse_and_uci() {
        // テスト項目: 生の指し手が解釈され、UCI 表記に変換される
        // given (前提条件):

        // when (操作):
        let plain = ChessMove::parse("e2", "e4", None).unwrap();
        let empty_promotion = ChessMove::parse("g1", "f3", Some("")).unwrap();
        let promotion = ChessMove::parse("a7", "a8", Some("q")).unwrap();
        let bad_promotion = ChessMove::parse("a7", "a8", Some("k"));

        // then (期待する結果):
        assert_eq!(plain.to_uci(), "e2e4");
        assert_eq!(empty_promotion.promotion, None);
        assert_eq!(promotion.to_uci(), "a7a8q");
        assert!(matches!(
            bad_promotion,
            Err(ValueObjectError::InvalidPromotion(_))
        ));
    }

    #[test]
    fn test_side_opposite() {
        // テスト項目: 手番の反転
        // given (前提条件):

        // when (操作):

        // then (期待する結果):
        assert_eq!(Side::White.opposite(), Side::Black);
        assert_eq!(Side::Black.opposite(), Side::White);
        assert_eq!(Side::White.as_str(), "w");
    }
}
