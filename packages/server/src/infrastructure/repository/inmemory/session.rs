//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! 待機スロットとセッションテーブルを HashMap / Option で保持します。
//!
//! ## ロック順序
//!
//! `waiting` → `sessions` の順でのみ取得します。個々のセッションの Mutex は
//! `sessions` のロック中に取得しません（`list_sessions` はハンドルを複製して
//! から `sessions` を解放し、その後に各セッションをロックします）。

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Pairing, ParticipantId, RepositoryError, SessionBuilder, SessionHandle, SessionKey,
    SessionRepository, SessionSummary,
};

#[derive(Default)]
struct SessionTable {
    /// Key: SessionKey（キー順に列挙するため BTreeMap）
    by_key: BTreeMap<SessionKey, SessionHandle>,
    /// 参加者 → 着席しているセッション
    by_participant: HashMap<ParticipantId, SessionKey>,
}

/// インメモリ Session Repository 実装
#[derive(Default)]
pub struct InMemorySessionRepository {
    /// 待機スロット（最大 1 人）
    waiting: Mutex<Option<ParticipantId>>,
    /// 進行中のセッション
    sessions: Mutex<SessionTable>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn pair_or_wait(
        &self,
        participant: ParticipantId,
        build: SessionBuilder,
    ) -> Result<Pairing, RepositoryError> {
        let mut waiting = self.waiting.lock().await;

        if waiting.as_ref() == Some(&participant)
            || self
                .sessions
                .lock()
                .await
                .by_participant
                .contains_key(&participant)
        {
            return Err(RepositoryError::ParticipantAlreadyEngaged(
                participant.into_string(),
            ));
        }

        let Some(white) = waiting.take() else {
            tracing::debug!("Participant '{}' is now waiting", participant);
            *waiting = Some(participant);
            return Ok(Pairing::Waiting);
        };

        let session = build(white, participant);
        let key = session.key().clone();
        let participants = session.participants();
        let handle: SessionHandle = Arc::new(Mutex::new(session));

        // 待機スロットのロックを保持したまま登録する
        let mut sessions = self.sessions.lock().await;
        for p in participants {
            sessions.by_participant.insert(p, key.clone());
        }
        sessions.by_key.insert(key.clone(), handle.clone());
        tracing::debug!("Session '{}' registered", key);

        Ok(Pairing::Paired(handle))
    }

    async fn leave_waiting(&self, participant: &ParticipantId) -> bool {
        let mut waiting = self.waiting.lock().await;
        if waiting.as_ref() == Some(participant) {
            *waiting = None;
            true
        } else {
            false
        }
    }

    async fn waiting_participant(&self) -> Option<ParticipantId> {
        self.waiting.lock().await.clone()
    }

    async fn is_engaged(&self, participant: &ParticipantId) -> bool {
        let waiting = self.waiting.lock().await;
        if waiting.as_ref() == Some(participant) {
            return true;
        }
        let sessions = self.sessions.lock().await;
        sessions.by_participant.contains_key(participant)
    }

    async fn find_session(&self, key: &SessionKey) -> Option<SessionHandle> {
        let sessions = self.sessions.lock().await;
        sessions.by_key.get(key).cloned()
    }

    async fn find_session_by_participant(
        &self,
        participant: &ParticipantId,
    ) -> Option<SessionHandle> {
        let sessions = self.sessions.lock().await;
        sessions
            .by_participant
            .get(participant)
            .and_then(|key| sessions.by_key.get(key))
            .cloned()
    }

    async fn remove_session(&self, key: &SessionKey) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        let handle = sessions.by_key.remove(key)?;
        sessions.by_participant.retain(|_, k| k != key);
        tracing::debug!("Session '{}' removed", key);
        Some(handle)
    }

    async fn list_sessions(&self) -> Vec<SessionSummary> {
        let handles: Vec<SessionHandle> = {
            let sessions = self.sessions.lock().await;
            sessions.by_key.values().cloned().collect()
        };

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            summaries.push(handle.lock().await.summary());
        }
        summaries
    }

    async fn count_sessions(&self) -> usize {
        self.sessions.lock().await.by_key.len()
    }
}
