//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 保持するもの
//!
//! - 待機中の参加者（最大 1 人）
//! - 進行中のセッション（`SessionKey` と参加者 ID の両方から引ける）

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    error::RepositoryError,
    session::{GameSession, SessionSummary},
    value_object::{ParticipantId, SessionKey},
};

/// 共有されるセッションへのハンドル
///
/// 1 つのセッションに対する操作はこの Mutex で直列化される。
pub type SessionHandle = Arc<Mutex<GameSession>>;

/// ペア成立時にセッションを組み立てる関数（引数は白, 黒の順）
pub type SessionBuilder = Box<dyn FnOnce(ParticipantId, ParticipantId) -> GameSession + Send>;

/// `pair_or_wait` の結果
#[derive(Debug)]
pub enum Pairing {
    /// 待機キューに入った
    Waiting,
    /// 待機中の参加者とペアになり、セッションが登録された
    Paired(SessionHandle),
}

/// Session Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// 待機中の参加者がいればペアにしてセッションを登録し、いなければ待機させる
    ///
    /// 待機キューの確認からセッションの登録までは不可分に行われる。
    /// 先に待機していた参加者が白になる。
    async fn pair_or_wait(
        &self,
        participant: ParticipantId,
        build: SessionBuilder,
    ) -> Result<Pairing, RepositoryError>;

    /// 待機キューから取り除く（待機していた場合 true）
    async fn leave_waiting(&self, participant: &ParticipantId) -> bool;

    /// 待機中の参加者
    async fn waiting_participant(&self) -> Option<ParticipantId>;

    /// 待機中、またはいずれかのセッションの参加者か
    async fn is_engaged(&self, participant: &ParticipantId) -> bool;

    /// キーでセッションを取得
    async fn find_session(&self, key: &SessionKey) -> Option<SessionHandle>;

    /// 参加者が座っているセッションを取得
    async fn find_session_by_participant(&self, participant: &ParticipantId)
    -> Option<SessionHandle>;

    /// セッションを削除（冪等。既に削除済みなら None）
    async fn remove_session(&self, key: &SessionKey) -> Option<SessionHandle>;

    /// 全セッションのサマリー（キー順）
    async fn list_sessions(&self) -> Vec<SessionSummary>;

    /// 進行中のセッション数
    async fn count_sessions(&self) -> usize;
}
