//! 接続イベントのルーティング
//!
//! 接続ごとのイベント（接続・指し手・切断）を対応するユースケースへ振り分けます。
//! 失敗は全てここでログに記録され、呼び出し元（UI 層）へは伝播しません。

use std::sync::Arc;

use crate::domain::{ParticipantId, PusherChannel};

use super::{
    connect_participant::ConnectParticipantUseCase,
    disconnect_participant::DisconnectParticipantUseCase,
    error::MoveError,
    make_move::{MakeMoveUseCase, MoveCommand},
};

/// 接続から届くイベント
#[derive(Debug)]
pub enum GameEvent {
    Connect {
        participant: ParticipantId,
        sender: PusherChannel,
    },
    Move {
        participant: ParticipantId,
        command: MoveCommand,
    },
    Disconnect {
        participant: ParticipantId,
    },
}

pub struct EventRouter {
    connect_participant: Arc<ConnectParticipantUseCase>,
    make_move: Arc<MakeMoveUseCase>,
    disconnect_participant: Arc<DisconnectParticipantUseCase>,
}

impl EventRouter {
    pub fn new(
        connect_participant: Arc<ConnectParticipantUseCase>,
        make_move: Arc<MakeMoveUseCase>,
        disconnect_participant: Arc<DisconnectParticipantUseCase>,
    ) -> Self {
        Self {
            connect_participant,
            make_move,
            disconnect_participant,
        }
    }

    pub async fn dispatch(&self, event: GameEvent) {
        match event {
            GameEvent::Connect {
                participant,
                sender,
            } => {
                if let Err(e) = self
                    .connect_participant
                    .execute(participant.clone(), sender)
                    .await
                {
                    tracing::warn!("Connect of '{}' rejected: {}", participant, e);
                }
            }
            GameEvent::Move {
                participant,
                command,
            } => match self.make_move.execute(&participant, command).await {
                Ok(outcome) => tracing::debug!("Move by '{}': {:?}", participant, outcome),
                Err(MoveError::UnknownSession) => {
                    tracing::debug!("Move by '{}' ignored: unknown session", participant)
                }
                Err(e) => tracing::debug!("Move by '{}' rejected: {}", participant, e),
            },
            GameEvent::Disconnect { participant } => {
                let outcome = self.disconnect_participant.execute(&participant).await;
                tracing::debug!("Disconnect of '{}': {:?}", participant, outcome);
            }
        }
    }
}
