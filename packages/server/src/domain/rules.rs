//! ルールエンジンの trait 定義
//!
//! 合法手の列挙、指し手の適用、終局判定、局面のシリアライズはドメイン外の
//! ルールエンジンに委譲します。具体的な実装は Infrastructure 層が提供します。
//!
//! 全ての呼び出しは値または `Result` を返し、ルールエンジン側の例外的な
//! 制御フローがドメイン層に漏れることはありません。

use std::fmt;

use super::{
    error::RulesError,
    value_object::{ChessMove, PromotionPiece, Side, Square},
};

/// 現在の局面で許される指し手
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegalMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PromotionPiece>,
}

impl LegalMove {
    /// 要求された指し手がこの合法手に一致するか
    ///
    /// 移動元・移動先が一致することが前提。合法手が成りの場合は成り駒も一致する
    /// 必要がある（未指定はクイーン扱い）。成りでない手では成り駒の指定を無視する。
    pub fn matches(&self, requested: &ChessMove) -> bool {
        if self.from != requested.from || self.to != requested.to {
            return false;
        }
        match self.promotion {
            Some(piece) => requested.promotion.unwrap_or(PromotionPiece::Queen) == piece,
            None => true,
        }
    }

    /// ルールエンジンに渡す正規化済みの指し手
    pub fn to_chess_move(&self) -> ChessMove {
        ChessMove::new(self.from, self.to, self.promotion)
    }
}

/// ルールエンジンが管理する局面
pub trait Position: Send + Sync + fmt::Debug {
    /// 手番（ルールエンジン側の正）
    fn turn(&self) -> Side;

    /// 合法手の一覧
    fn legal_moves(&self) -> Vec<LegalMove>;

    /// 指し手を適用した新しい局面を返す（自身は変更しない）
    fn play(&self, mv: &ChessMove) -> Result<Box<dyn Position>, RulesError>;

    /// 終局しているか（詰み・ステイルメイト・駒不足・50 手ルール・千日手）
    fn is_terminal(&self) -> bool;

    /// 詰みか
    fn is_checkmate(&self) -> bool;

    /// FEN 形式でシリアライズ
    fn to_fen(&self) -> String;
}

/// 局面を生成するルールエンジン
pub trait RulesEngine: Send + Sync {
    /// 初期局面
    fn initial_position(&self) -> Box<dyn Position>;

    /// FEN 形式からデシリアライズ
    fn load(&self, fen: &str) -> Result<Box<dyn Position>, RulesError>;
}
