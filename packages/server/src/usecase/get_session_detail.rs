//! UseCase: セッション詳細取得

use std::sync::Arc;

use crate::domain::{SessionKey, SessionRepository, SessionSummary};

use super::error::GetSessionDetailError;

pub struct GetSessionDetailUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl GetSessionDetailUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// `session_key` のセッションを取得（不正な形式のキーも未検出として扱う）
    pub async fn execute(&self, session_key: String) -> Result<SessionSummary, GetSessionDetailError> {
        let key = SessionKey::new(session_key).map_err(|_| GetSessionDetailError::SessionNotFound)?;
        let handle = self
            .repository
            .find_session(&key)
            .await
            .ok_or(GetSessionDetailError::SessionNotFound)?;
        let summary = handle.lock().await.summary();
        Ok(summary)
    }
}
