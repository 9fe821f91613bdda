//! ルールエンジンの実装
//!
//! - `shakmaty`: shakmaty クレートを使った標準チェスの実装

pub mod shakmaty;

pub use self::shakmaty::{ShakmatyPosition, ShakmatyRules};
