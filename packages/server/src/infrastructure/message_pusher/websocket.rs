//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 参加者ごとの `UnboundedSender` を管理
//! - ドメインイベントを JSON にシリアライズして送信（push_to, broadcast）
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された sender を受け取り、送信にのみ使用します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{MessagePushError, MessagePusher, ParticipantId, PusherChannel, ServerEvent},
    infrastructure::dto::conversion::event_to_json,
};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中の参加者の WebSocket sender
    clients: Mutex<HashMap<ParticipantId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    fn serialize(event: &ServerEvent) -> Result<String, MessagePushError> {
        event_to_json(event).map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, participant: ParticipantId, sender: PusherChannel) {
        tracing::debug!("Client '{}' registered to MessagePusher", participant);
        let mut clients = self.clients.lock().await;
        clients.insert(participant, sender);
    }

    async fn unregister_client(&self, participant: &ParticipantId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(participant).is_some() {
            tracing::debug!("Client '{}' unregistered from MessagePusher", participant);
        }
    }

    async fn push_to(
        &self,
        participant: &ParticipantId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let content = Self::serialize(event)?;
        let clients = self.clients.lock().await;

        let sender = clients
            .get(participant)
            .ok_or_else(|| MessagePushError::ClientNotFound(participant.to_string()))?;
        sender
            .send(content)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed {:?} to client '{}'", event, participant);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: &[ParticipantId],
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let content = Self::serialize(event)?;
        let clients = self.clients.lock().await;

        for target in targets {
            let Some(sender) = clients.get(target) else {
                tracing::warn!("Client '{}' not found during broadcast, skipping", target);
                continue;
            };
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = sender.send(content.clone()) {
                tracing::warn!("Failed to push message to client '{}': {}", target, e);
            }
        }
        tracing::debug!("Broadcasted {:?} to {} client(s)", event, targets.len());

        Ok(())
    }
}
