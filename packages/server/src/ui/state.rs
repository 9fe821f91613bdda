//! Shared application state.

use std::sync::Arc;

use crate::usecase::{EventRouter, GetSessionDetailUseCase, GetSessionsUseCase};

/// Shared application state
pub struct AppState {
    /// EventRouter（WebSocket イベントの振り分け）
    pub event_router: Arc<EventRouter>,
    /// GetSessionsUseCase（セッション一覧取得のユースケース）
    pub get_sessions_usecase: Arc<GetSessionsUseCase>,
    /// GetSessionDetailUseCase（セッション詳細取得のユースケース）
    pub get_session_detail_usecase: Arc<GetSessionDetailUseCase>,
}
