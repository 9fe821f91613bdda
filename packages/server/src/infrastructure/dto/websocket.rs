//! WebSocket message DTOs.
//!
//! Every frame is a JSON object with a `type` discriminator.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Status,
    PlayerRole,
    GameStart,
    Move,
    BoardState,
    UpdateTimers,
    InvalidMove,
    GameOver,
}

/// A move as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDto {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

/// Inbound move request (client -> server)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub r#type: MessageType,
    #[serde(rename = "move")]
    pub mv: MoveDto,
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub r#type: MessageType,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRoleMessage {
    pub r#type: MessageType,
    /// "w" or "b"
    pub role: String,
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStartMessage {
    pub r#type: MessageType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveMessage {
    pub r#type: MessageType,
    #[serde(rename = "move")]
    pub mv: MoveDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardStateMessage {
    pub r#type: MessageType,
    pub fen: String,
}

/// Remaining time per side in milliseconds (may be negative)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTimersMessage {
    pub r#type: MessageType,
    pub w: i64,
    pub b: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidMoveMessage {
    pub r#type: MessageType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverMessage {
    pub r#type: MessageType,
    /// "w", "b" or "draw"
    pub result: String,
    pub reason: String,
}

/// Any server -> client frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Status(StatusMessage),
    PlayerRole(PlayerRoleMessage),
    GameStart(GameStartMessage),
    Move(MoveMessage),
    BoardState(BoardStateMessage),
    UpdateTimers(UpdateTimersMessage),
    InvalidMove(InvalidMoveMessage),
    GameOver(GameOverMessage),
}
