//! Conversion logic between DTOs and domain models.

use taikyoku_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::{
    ChessMove, ClockSnapshot, GameOutcome, GameResult, ServerEvent, SessionSummary,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Domain Model → DTO
// ========================================

impl From<&ChessMove> for dto::MoveDto {
    fn from(mv: &ChessMove) -> Self {
        Self {
            from: mv.from.to_string(),
            to: mv.to.to_string(),
            promotion: mv.promotion.map(|p| p.as_char().to_string()),
        }
    }
}

fn result_str(outcome: &GameOutcome) -> String {
    match outcome.result {
        GameResult::Win(side) => side.as_str().to_string(),
        GameResult::Draw => "draw".to_string(),
    }
}

impl From<&ServerEvent> for dto::OutboundMessage {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::Status(text) => Self::Status(dto::StatusMessage {
                r#type: dto::MessageType::Status,
                text: text.clone(),
            }),
            ServerEvent::RoleAssigned { side, session_key } => {
                Self::PlayerRole(dto::PlayerRoleMessage {
                    r#type: dto::MessageType::PlayerRole,
                    role: side.as_str().to_string(),
                    room_id: session_key.as_str().to_string(),
                })
            }
            ServerEvent::GameStarted => Self::GameStart(dto::GameStartMessage {
                r#type: dto::MessageType::GameStart,
            }),
            ServerEvent::MovePlayed(mv) => Self::Move(dto::MoveMessage {
                r#type: dto::MessageType::Move,
                mv: mv.into(),
            }),
            ServerEvent::BoardState(fen) => Self::BoardState(dto::BoardStateMessage {
                r#type: dto::MessageType::BoardState,
                fen: fen.clone(),
            }),
            ServerEvent::ClockUpdate(ClockSnapshot {
                white_millis,
                black_millis,
            }) => Self::UpdateTimers(dto::UpdateTimersMessage {
                r#type: dto::MessageType::UpdateTimers,
                w: *white_millis,
                b: *black_millis,
            }),
            ServerEvent::InvalidMove => Self::InvalidMove(dto::InvalidMoveMessage {
                r#type: dto::MessageType::InvalidMove,
            }),
            ServerEvent::GameOver(outcome) => Self::GameOver(dto::GameOverMessage {
                r#type: dto::MessageType::GameOver,
                result: result_str(outcome),
                reason: outcome.reason.as_str().to_string(),
            }),
        }
    }
}

impl From<&SessionSummary> for http::SessionSummaryDto {
    fn from(summary: &SessionSummary) -> Self {
        Self {
            room_id: summary.key.as_str().to_string(),
            white: summary.seats.white.as_str().to_string(),
            black: summary.seats.black.as_str().to_string(),
            side_to_move: summary.side_to_move.as_str().to_string(),
            ply: summary.ply,
            created_at: timestamp_to_jst_rfc3339(summary.created_at.value()),
        }
    }
}

impl From<&SessionSummary> for http::SessionDetailDto {
    fn from(summary: &SessionSummary) -> Self {
        Self {
            room_id: summary.key.as_str().to_string(),
            white: summary.seats.white.as_str().to_string(),
            black: summary.seats.black.as_str().to_string(),
            side_to_move: summary.side_to_move.as_str().to_string(),
            ply: summary.ply,
            fen: summary.fen.clone(),
            clock: http::ClockDto {
                w: summary.clock.white_millis,
                b: summary.clock.black_millis,
            },
            created_at: timestamp_to_jst_rfc3339(summary.created_at.value()),
        }
    }
}

/// Serialize an outbound event to a JSON text frame
pub fn event_to_json(event: &ServerEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&dto::OutboundMessage::from(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParticipantId, Seats, SessionKey, Side, Timestamp};
    use serde_json::{Value, json};

    fn to_value(event: &ServerEvent) -> Value {
        serde_json::from_str(&event_to_json(event).unwrap()).unwrap()
    }

    #[test]
    fn test_player_role_frame() {
        // テスト項目: 手番割り当ては player_role として role / room_id を持つ
        // given (前提条件):
        let key = SessionKey::from_pair(
            &ParticipantId::new("alice".to_string()).unwrap(),
            &ParticipantId::new("bob".to_string()).unwrap(),
        );
        let event = ServerEvent::RoleAssigned {
            side: Side::Black,
            session_key: key,
        };

        // when (操作):
        let value = to_value(&event);

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"type": "player_role", "role": "b", "room_id": "alice:bob"})
        );
    }

    #[test]
    fn test_move_frame_omits_missing_promotion() {
        // テスト項目: 成りのない指し手は promotion フィールドを含まない
        // given (前提条件):
        let event = ServerEvent::MovePlayed(ChessMove::parse("e2", "e4", None).unwrap());

        // when (操作):
        let value = to_value(&event);

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"type": "move", "move": {"from": "e2", "to": "e4"}})
        );
    }

    #[test]
    fn test_timer_frame_keeps_negative_values() {
        // テスト項目: 残り時間は負の値もそのまま送られる
        // given (前提条件):
        let event = ServerEvent::ClockUpdate(ClockSnapshot {
            white_millis: -120,
            black_millis: 299_000,
        });

        // when (操作):
        let value = to_value(&event);

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"type": "update_timers", "w": -120, "b": 299_000})
        );
    }

    #[test]
    fn test_game_over_frames() {
        // テスト項目: 終局は勝者（w / b / draw）と理由を持つ
        // given (前提条件):
        let mate = ServerEvent::GameOver(GameOutcome::checkmate(Side::Black));
        let draw = ServerEvent::GameOver(GameOutcome::draw());
        let departed = ServerEvent::GameOver(GameOutcome::opponent_departed(Side::Black));

        // when (操作):
        let values = [to_value(&mate), to_value(&draw), to_value(&departed)];

        // then (期待する結果):
        assert_eq!(
            values[0],
            json!({"type": "game_over", "result": "b", "reason": "checkmate"})
        );
        assert_eq!(
            values[1],
            json!({"type": "game_over", "result": "draw", "reason": "draw"})
        );
        assert_eq!(
            values[2],
            json!({"type": "game_over", "result": "w", "reason": "opponent_departed"})
        );
    }

    fn sample_summary() -> SessionSummary {
        let white = ParticipantId::new("alice".to_string()).unwrap();
        let black = ParticipantId::new("bob".to_string()).unwrap();
        SessionSummary {
            key: SessionKey::from_pair(&white, &black),
            seats: Seats { white, black },
            side_to_move: Side::Black,
            clock: ClockSnapshot {
                white_millis: 298_500,
                black_millis: 300_000,
            },
            ply: 1,
            fen: "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1".to_string(),
            created_at: Timestamp::new(1672498800000),
        }
    }

    #[test]
    fn test_session_list_entry_is_lightweight() {
        // テスト項目: 一覧の要素は局面・時計を含まず、詳細のみがそれらを持つ
        // given (前提条件):
        let summary = sample_summary();

        // when (操作):
        let entry = serde_json::to_value(http::SessionSummaryDto::from(&summary)).unwrap();
        let detail = serde_json::to_value(http::SessionDetailDto::from(&summary)).unwrap();

        // then (期待する結果):
        let mut entry_keys: Vec<&str> = entry
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        entry_keys.sort_unstable();
        assert_eq!(
            entry_keys,
            vec!["black", "created_at", "ply", "room_id", "side_to_move", "white"]
        );
        assert_eq!(entry["room_id"], "alice:bob");
        assert!(
            entry["created_at"]
                .as_str()
                .unwrap()
                .starts_with("2023-01-01T00:00:00")
        );
        assert_eq!(detail["fen"], summary.fen.as_str());
        assert_eq!(detail["clock"], json!({"w": 298_500, "b": 300_000}));
    }
}
