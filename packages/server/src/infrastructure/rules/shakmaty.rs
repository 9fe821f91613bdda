//! shakmaty を使った RulesEngine 実装
//!
//! 合法手生成・指し手の適用・FEN の入出力は shakmaty に委譲します。
//! 千日手の判定のため、局面ごとに同一配置の出現回数を持ち回ります。

use std::collections::HashMap;

use shakmaty::{
    CastlingMode, Chess, Color, EnPassantMode, Position as _, fen::Fen, uci::UciMove,
};

use crate::domain::{ChessMove, LegalMove, Position, RulesEngine, RulesError, Side};

/// 50 手ルール（100 半手）
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// 千日手（同一局面 3 回）
const REPETITION_LIMIT: u8 = 3;

/// 標準チェスのルールエンジン
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyRules;

impl RulesEngine for ShakmatyRules {
    fn initial_position(&self) -> Box<dyn Position> {
        Box::new(ShakmatyPosition::new(Chess::default()))
    }

    fn load(&self, fen: &str) -> Result<Box<dyn Position>, RulesError> {
        let fen: Fen = fen
            .parse()
            .map_err(|e| RulesError::InvalidFen(format!("{e}")))?;
        let position: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidFen(format!("{e}")))?;
        Ok(Box::new(ShakmatyPosition::new(position)))
    }
}

/// shakmaty の局面 + 千日手判定用の出現回数
#[derive(Debug, Clone)]
pub struct ShakmatyPosition {
    position: Chess,
    /// Key: FEN の先頭 4 フィールド（配置・手番・キャスリング権・アンパッサン）
    repetitions: HashMap<String, u8>,
}

impl ShakmatyPosition {
    fn new(position: Chess) -> Self {
        let mut repetitions = HashMap::new();
        repetitions.insert(repetition_key(&position), 1);
        Self {
            position,
            repetitions,
        }
    }

    fn repetition_count(&self) -> u8 {
        self.repetitions
            .get(&repetition_key(&self.position))
            .copied()
            .unwrap_or(0)
    }
}

fn fen_of(position: &Chess) -> String {
    Fen::from_position(position.clone(), EnPassantMode::Legal).to_string()
}

fn repetition_key(position: &Chess) -> String {
    fen_of(position)
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

/// UCI 文字列（e2e4, e7e8q）をドメインの指し手に変換
fn parse_uci(uci: &str) -> Option<ChessMove> {
    let from = uci.get(0..2)?;
    let to = uci.get(2..4)?;
    ChessMove::parse(from, to, uci.get(4..)).ok()
}

impl Position for ShakmatyPosition {
    fn turn(&self) -> Side {
        side_of(self.position.turn())
    }

    fn legal_moves(&self) -> Vec<LegalMove> {
        self.position
            .legal_moves()
            .iter()
            .filter_map(|m| {
                // キャスリングは king の移動先（e1g1 など）で表現される
                let uci = UciMove::from_move(m, CastlingMode::Standard).to_string();
                parse_uci(&uci).map(|mv| LegalMove {
                    from: mv.from,
                    to: mv.to,
                    promotion: mv.promotion,
                })
            })
            .collect()
    }

    fn play(&self, mv: &ChessMove) -> Result<Box<dyn Position>, RulesError> {
        let uci = mv.to_uci();
        let m = uci
            .parse::<UciMove>()
            .map_err(|_| RulesError::InvalidMove(uci.clone()))?
            .to_move(&self.position)
            .map_err(|_| RulesError::IllegalMove(uci.clone()))?;
        let position = self
            .position
            .clone()
            .play(&m)
            .map_err(|_| RulesError::IllegalMove(uci))?;

        let mut repetitions = self.repetitions.clone();
        *repetitions.entry(repetition_key(&position)).or_insert(0) += 1;

        Ok(Box::new(Self {
            position,
            repetitions,
        }))
    }

    fn is_terminal(&self) -> bool {
        self.position.is_checkmate()
            || self.position.is_stalemate()
            || self.position.is_insufficient_material()
            || self.position.halfmoves() >= FIFTY_MOVE_HALFMOVES
            || self.repetition_count() >= REPETITION_LIMIT
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn to_fen(&self) -> String {
        fen_of(&self.position)
    }
}
