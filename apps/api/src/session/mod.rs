//! Session context: the one place a result outlives its request.
//!
//! A session is created by the first successful action that does not name
//! one, holds a single result slot that each later successful action
//! replaces wholesale (last write wins), and is discarded explicitly or
//! once it has been idle longer than the store's idle TTL. Failed actions
//! never touch it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

pub mod export;
pub mod handlers;

/// Which page produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Requirements,
    Match,
    Report,
    Resume,
}

/// The content of the session slot.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    pub kind: ResultKind,
    pub value: Value,
    /// The completion the value was extracted from, verbatim.
    pub raw_text: String,
    pub model: Option<String>,
    pub produced_at: DateTime<Utc>,
}

impl SessionResult {
    pub fn new(kind: ResultKind, value: Value, raw_text: String, model: Option<String>) -> Self {
        Self {
            kind,
            value,
            raw_text,
            model,
            produced_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Time of the last successful write to the slot.
    pub last_active: DateTime<Utc>,
    pub slot: SessionResult,
}

impl Session {
    fn is_idle(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        (now - self.last_active)
            .to_std()
            .is_ok_and(|idle| idle > ttl)
    }
}

#[derive(Debug, Error)]
#[error("Session {0} not found")]
pub struct UnknownSession(pub Uuid);

const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl SessionStore {
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            idle_ttl,
        }
    }

    /// Stores `result` in the named session's slot, or in a new session when
    /// `session_id` is `None`. Returns the session id.
    pub async fn record(
        &self,
        session_id: Option<Uuid>,
        result: SessionResult,
    ) -> Result<Uuid, UnknownSession> {
        let now = Utc::now();
        let mut sessions = self.inner.write().await;

        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(now, self.idle_ttl));
        if sessions.len() < before {
            debug!("Dropped {} idle sessions", before - sessions.len());
        }

        match session_id {
            Some(id) => {
                let session = sessions.get_mut(&id).ok_or(UnknownSession(id))?;
                session.slot = result;
                session.last_active = now;
                Ok(id)
            }
            None => {
                let id = Uuid::new_v4();
                info!("Session {id} created ({:?})", result.kind);
                sessions.insert(
                    id,
                    Session {
                        id,
                        created_at: now,
                        last_active: now,
                        slot: result,
                    },
                );
                Ok(id)
            }
        }
    }

    /// An idle session reads as unknown even before it is swept.
    pub async fn get(&self, id: Uuid) -> Result<Session, UnknownSession> {
        self.inner
            .read()
            .await
            .get(&id)
            .filter(|session| !session.is_idle(Utc::now(), self.idle_ttl))
            .cloned()
            .ok_or(UnknownSession(id))
    }

    /// Resolves an optional session reference to its current slot.
    /// `None` in, `None` out; an unknown id is an error.
    pub async fn prior(&self, id: Option<Uuid>) -> Result<Option<SessionResult>, UnknownSession> {
        match id {
            Some(id) => Ok(Some(self.get(id).await?.slot)),
            None => Ok(None),
        }
    }

    pub async fn discard(&self, id: Uuid) -> Result<(), UnknownSession> {
        self.inner
            .write()
            .await
            .remove(&id)
            .filter(|session| !session.is_idle(Utc::now(), self.idle_ttl))
            .map(|_| info!("Session {id} discarded"))
            .ok_or(UnknownSession(id))
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn result(kind: ResultKind, value: Value) -> SessionResult {
        SessionResult::new(kind, value.clone(), value.to_string(), None)
    }

    #[tokio::test]
    async fn test_first_record_creates_session() {
        let store = SessionStore::default();
        let id = store
            .record(None, result(ResultKind::Requirements, json!({"job_type": "SRE"})))
            .await
            .unwrap();

        let session = store.get(id).await.unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.slot.kind, ResultKind::Requirements);
        assert_eq!(session.slot.value["job_type"], "SRE");
    }

    #[tokio::test]
    async fn test_record_replaces_slot_wholesale() {
        let store = SessionStore::default();
        let id = store
            .record(None, result(ResultKind::Requirements, json!({"job_type": "SRE", "extra": 1})))
            .await
            .unwrap();
        store
            .record(Some(id), result(ResultKind::Match, json!({"matches": []})))
            .await
            .unwrap();

        let slot = store.get(id).await.unwrap().slot;
        assert_eq!(slot.kind, ResultKind::Match);
        assert_eq!(slot.value, json!({"matches": []}));
    }

    #[tokio::test]
    async fn test_record_into_unknown_session_fails() {
        let store = SessionStore::default();
        let missing = Uuid::new_v4();
        let err = store
            .record(Some(missing), result(ResultKind::Report, json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.0, missing);
    }

    #[tokio::test]
    async fn test_prior_resolves_optional_reference() {
        let store = SessionStore::default();
        assert!(store.prior(None).await.unwrap().is_none());
        assert!(store.prior(Some(Uuid::new_v4())).await.is_err());

        let id = store
            .record(None, result(ResultKind::Match, json!({"matches": []})))
            .await
            .unwrap();
        let prior = store.prior(Some(id)).await.unwrap().unwrap();
        assert_eq!(prior.kind, ResultKind::Match);
    }

    #[tokio::test]
    async fn test_discard_removes_session() {
        let store = SessionStore::default();
        let id = store
            .record(None, result(ResultKind::Resume, json!({"name": "Ada"})))
            .await
            .unwrap();
        store.discard(id).await.unwrap();
        assert!(store.get(id).await.is_err());
        assert!(store.discard(id).await.is_err());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = SessionStore::default();
        let a = store
            .record(None, result(ResultKind::Requirements, json!({"job_type": "A"})))
            .await
            .unwrap();
        let b = store
            .record(None, result(ResultKind::Requirements, json!({"job_type": "B"})))
            .await
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(store.get(a).await.unwrap().slot.value["job_type"], "A");
        assert_eq!(store.get(b).await.unwrap().slot.value["job_type"], "B");
    }

    #[tokio::test]
    async fn test_idle_sessions_expire_and_are_swept() {
        let store = SessionStore::with_idle_ttl(Duration::from_millis(20));
        let stale = store
            .record(None, result(ResultKind::Requirements, json!({"job_type": "SRE"})))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(store.get(stale).await.is_err());
        assert!(store.prior(Some(stale)).await.is_err());

        let fresh = store
            .record(None, result(ResultKind::Match, json!({"matches": []})))
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);
        assert!(store.get(fresh).await.is_ok());
        assert!(store
            .record(Some(stale), result(ResultKind::Report, json!({})))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_writes_keep_a_session_alive() {
        let store = SessionStore::with_idle_ttl(Duration::from_millis(250));
        let id = store
            .record(None, result(ResultKind::Requirements, json!({"job_type": "SRE"})))
            .await
            .unwrap();

        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            store
                .record(Some(id), result(ResultKind::Match, json!({"matches": []})))
                .await
                .unwrap();
        }
        assert!(store.get(id).await.is_ok());
    }
}
