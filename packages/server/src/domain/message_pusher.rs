//! MessagePusher trait 定義
//!
//! 参加者へのイベント通知のインターフェース。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, event::ServerEvent, value_object::ParticipantId};

/// 参加者ごとの送信チャネル（シリアライズ済みのメッセージを流す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 参加者の送信チャネルを登録
    async fn register_client(&self, participant: ParticipantId, sender: PusherChannel);

    /// 参加者の送信チャネルを削除
    async fn unregister_client(&self, participant: &ParticipantId);

    /// 特定の参加者にイベントを送信
    async fn push_to(
        &self,
        participant: &ParticipantId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の参加者にイベントを送信（一部の送信失敗は許容）
    async fn broadcast(
        &self,
        targets: &[ParticipantId],
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;
}
