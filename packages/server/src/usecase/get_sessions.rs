//! UseCase: セッション一覧取得

use std::sync::Arc;

use crate::domain::{SessionRepository, SessionSummary};

pub struct GetSessionsUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl GetSessionsUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 進行中の全セッション（キー順）
    pub async fn execute(&self) -> Vec<SessionSummary> {
        self.repository.list_sessions().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{GameSession, ParticipantId, RulesEngine, TimeControl, Timestamp},
        infrastructure::{repository::InMemorySessionRepository, rules::ShakmatyRules},
    };

    #[tokio::test]
    async fn test_get_sessions() {
        // テスト項目: 進行中のセッションが一覧で返される
        // given (前提条件):
        let repository = Arc::new(InMemorySessionRepository::new());
        let usecase = GetSessionsUseCase::new(repository.clone());
        assert!(usecase.execute().await.is_empty());
        for name in ["alice", "bob"] {
            repository
                .pair_or_wait(
                    ParticipantId::new(name.to_string()).unwrap(),
                    Box::new(|white, black| {
                        GameSession::new(
                            white,
                            black,
                            ShakmatyRules.initial_position(),
                            TimeControl::default(),
                            Timestamp::new(0),
                        )
                    }),
                )
                .await
                .unwrap();
        }

        // when (操作):
        let sessions = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].key.as_str(), "alice:bob");
        assert_eq!(sessions[0].ply, 0);
    }
}
