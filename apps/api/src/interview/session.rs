//! Live voice-interview sessions.
//!
//! A session is the mutable cursor over a plan's voice questions while the
//! candidate is on the line. Sessions are ephemeral (24h TTL by default);
//! answers are flushed into the plan document when the session ends, so the
//! plan row stays the durable record.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::models::VoiceQuestion;
use crate::models::plan::VoiceAnswer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub user_id: Uuid,
    pub questions: Vec<VoiceQuestion>,
    pub answers: Vec<VoiceAnswer>,
    /// Index of the next unanswered question.
    pub cursor: usize,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
}

impl InterviewSession {
    pub fn new(plan_id: Uuid, user_id: Uuid, questions: Vec<VoiceQuestion>) -> Self {
        Self {
            id: Uuid::new_v4(),
            plan_id,
            user_id,
            questions,
            answers: Vec::new(),
            cursor: 0,
            status: SessionStatus::Active,
            started_at: Utc::now(),
        }
    }

    pub fn current_question(&self) -> Option<&VoiceQuestion> {
        self.questions.get(self.cursor)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.questions.len()
    }
}

/// Session persistence. One session per id; `put` replaces atomically.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<InterviewSession>, AppError>;
    async fn put(&self, session: &InterviewSession) -> Result<(), AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory backend (single-instance deployments, tests)
// ────────────────────────────────────────────────────────────────────────────

struct TimedSession {
    session: InterviewSession,
    stored_at: Instant,
}

pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, TimedSession>>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_secs(ttl_secs),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: Uuid) -> Result<Option<InterviewSession>, AppError> {
        // Lazy expiry: expired entries are dropped on access.
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            Some(timed) if timed.stored_at.elapsed() < self.ttl => {
                Ok(Some(timed.session.clone()))
            }
            Some(_) => {
                sessions.remove(&id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, session: &InterviewSession) -> Result<(), AppError> {
        self.sessions.write().await.insert(
            session.id,
            TimedSession {
                session: session.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Redis backend (multi-instance deployments)
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisSessionStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    fn key(id: Uuid) -> String {
        format!("interview:session:{id}")
    }

    async fn conn(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Session(format!("Redis connection failed: {e}")))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, id: Uuid) -> Result<Option<InterviewSession>, AppError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn
            .get(Self::key(id))
            .await
            .map_err(|e| AppError::Session(format!("Redis GET failed: {e}")))?;
        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| AppError::Session(format!("corrupt session record: {e}"))),
            None => Ok(None),
        }
    }

    async fn put(&self, session: &InterviewSession) -> Result<(), AppError> {
        let json = serde_json::to_string(session)
            .map_err(|e| AppError::Session(format!("session serialization failed: {e}")))?;
        let mut conn = self.conn().await?;
        conn.set_ex::<_, _, ()>(Self::key(session.id), json, self.ttl_secs)
            .await
            .map_err(|e| AppError::Session(format!("Redis SET failed: {e}")))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(Self::key(id))
            .await
            .map_err(|e| AppError::Session(format!("Redis DEL failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str) -> VoiceQuestion {
        VoiceQuestion {
            id: Uuid::new_v4(),
            text: text.to_string(),
            topic: "general".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = InMemorySessionStore::new(60);
        let session = InterviewSession::new(Uuid::new_v4(), Uuid::new_v4(), vec![question("q1")]);
        store.put(&session).await.unwrap();

        let loaded = store.get(session.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.status, SessionStatus::Active);
        assert_eq!(loaded.cursor, 0);

        store.delete(session.id).await.unwrap();
        assert!(store.get(session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_expires() {
        let store = InMemorySessionStore::new(0);
        let session = InterviewSession::new(Uuid::new_v4(), Uuid::new_v4(), vec![question("q1")]);
        store.put(&session).await.unwrap();
        assert!(store.get(session.id).await.unwrap().is_none());
    }

    #[test]
    fn test_session_cursor_progression() {
        let mut session =
            InterviewSession::new(Uuid::new_v4(), Uuid::new_v4(), vec![question("q1"), question("q2")]);
        assert_eq!(session.current_question().unwrap().text, "q1");
        assert!(!session.is_finished());

        session.cursor = 2;
        assert!(session.current_question().is_none());
        assert!(session.is_finished());
    }

    #[test]
    fn test_session_serialization_round_trip() {
        let session = InterviewSession::new(Uuid::new_v4(), Uuid::new_v4(), vec![question("q1")]);
        let json = serde_json::to_string(&session).unwrap();
        let back: InterviewSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, session.id);
        assert_eq!(back.questions.len(), 1);
    }
}
