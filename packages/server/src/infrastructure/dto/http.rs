//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockDto {
    pub w: i64,
    pub b: i64,
}

/// Entry of `GET /api/sessions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummaryDto {
    pub room_id: String,
    pub white: String,
    pub black: String,
    pub side_to_move: String,
    pub ply: u32,
    pub created_at: String,
}

/// Body of `GET /api/sessions/{session_key}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetailDto {
    pub room_id: String,
    pub white: String,
    pub black: String,
    pub side_to_move: String,
    pub ply: u32,
    pub fen: String,
    pub clock: ClockDto,
    pub created_at: String,
}
