//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ParticipantId, ParticipantIdFactory},
    infrastructure::dto::websocket::{MessageType, MoveRequest},
    ui::state::AppState,
    usecase::{GameEvent, MoveCommand},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // 参加者 ID は接続ごとにサーバーが発行する
    let participant = ParticipantIdFactory::generate();
    ws.on_upgrade(move |socket| handle_socket(socket, state, participant))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Parse an inbound text frame into a move event (anything else is ignored)
fn parse_move(participant: &ParticipantId, text: &str) -> Option<GameEvent> {
    let request = match serde_json::from_str::<MoveRequest>(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Ignoring malformed frame from '{}': {}", participant, e);
            return None;
        }
    };
    if request.r#type != MessageType::Move {
        tracing::warn!(
            "Ignoring unexpected {:?} frame from '{}'",
            request.r#type,
            participant
        );
        return None;
    }

    Some(GameEvent::Move {
        participant: participant.clone(),
        command: MoveCommand {
            session_key: request.room_id,
            from: request.mv.from,
            to: request.mv.to,
            promotion: request.mv.promotion,
        },
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, participant: ParticipantId) {
    tracing::info!("Participant '{}' connected", participant);
    let (sender, mut receiver) = socket.split();

    // Create a channel for this participant to receive messages
    let (tx, rx) = mpsc::unbounded_channel();
    let mut send_task = pusher_loop(rx, sender);

    state
        .event_router
        .dispatch(GameEvent::Connect {
            participant: participant.clone(),
            sender: tx,
        })
        .await;

    // Spawn a task to receive messages from this participant
    let router = state.event_router.clone();
    let recv_participant = participant.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error from '{}': {}", recv_participant, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", recv_participant, text);
                    if let Some(event) = parse_move(&recv_participant, text.as_str()) {
                        router.dispatch(event).await;
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Participant '{}' requested close", recv_participant);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .event_router
        .dispatch(GameEvent::Disconnect {
            participant: participant.clone(),
        })
        .await;
    tracing::info!("Participant '{}' disconnected", participant);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid() -> ParticipantId {
        ParticipantId::new("alice".to_string()).unwrap()
    }

    #[test]
    fn test_parse_move_frame() {
        // テスト項目: move フレームが指し手イベントに変換される
        // given (前提条件):
        let text = r#"{"type":"move","move":{"from":"e7","to":"e8","promotion":"q"},"room_id":"a:b"}"#;

        // when (操作):
        let event = parse_move(&pid(), text);

        // then (期待する結果):
        match event {
            Some(GameEvent::Move {
                participant,
                command,
            }) => {
                assert_eq!(participant, pid());
                assert_eq!(command.session_key, "a:b");
                assert_eq!(command.from, "e7");
                assert_eq!(command.to, "e8");
                assert_eq!(command.promotion.as_deref(), Some("q"));
            }
            other => panic!("expected move event, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_ignores_other_frames() {
        // テスト項目: 不正な JSON や move 以外のフレームは無視される
        // given (前提条件):
        let garbage = "not json";
        let other_type = r#"{"type":"status","move":{"from":"e2","to":"e4"},"room_id":"a:b"}"#;

        // when (操作):
        let garbage_event = parse_move(&pid(), garbage);
        let other_event = parse_move(&pid(), other_type);

        // then (期待する結果):
        assert!(garbage_event.is_none());
        assert!(other_event.is_none());
    }

    #[test]
    fn test_parse_forwards_off_board_squares_unvalidated() {
        // テスト項目: 盤外のマスを含む move フレームもそのまま指し手イベントになる
        //             （invalid_move の判定は指し手処理側で行う）
        // given (前提条件):
        let text = r#"{"type":"move","move":{"from":"z9","to":"e4"},"room_id":"a:b"}"#;

        // when (操作):
        let event = parse_move(&pid(), text);

        // then (期待する結果):
        match event {
            Some(GameEvent::Move { command, .. }) => {
                assert_eq!(command.from, "z9");
                assert_eq!(command.promotion, None);
            }
            other => panic!("expected move event, got {other:?}"),
        }
    }
}
