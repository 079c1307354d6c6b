//! In-memory session store.
//!
//! The only store the engine ships with: sessions live for the lifetime of
//! the process and are lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::session::Session;
use crate::ports::{SessionStore, SessionStoreError};

/// Session store backed by a single `RwLock<HashMap>`.
///
/// One global lock is enough: sessions of different users never interact,
/// and each operation holds the lock only for a map access.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(InMemorySessionStore::new());
/// store.put(Session::start(user_id, &workflow)).await?;
/// assert_eq!(store.len().await?, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<UserId, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Users that currently have a session, in no particular order.
    pub async fn users(&self) -> Vec<UserId> {
        self.sessions.read().await.keys().copied().collect()
    }

    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: UserId) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.sessions.read().await.get(&user_id).cloned())
    }

    async fn put(&self, session: Session) -> Result<Option<Session>, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.insert(session.user_id(), session))
    }

    async fn delete(&self, user_id: UserId) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.sessions.write().await.remove(&user_id))
    }

    async fn idle_users(
        &self,
        ttl: Duration,
        now: Timestamp,
    ) -> Result<Vec<UserId>, SessionStoreError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.is_idle(ttl, &now))
            .map(Session::user_id)
            .collect())
    }

    async fn remove_idle(
        &self,
        user_id: UserId,
        ttl: Duration,
        now: Timestamp,
    ) -> Result<Option<Session>, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let idle = sessions
            .get(&user_id)
            .is_some_and(|s| s.is_idle(ttl, &now));
        Ok(if idle { sessions.remove(&user_id) } else { None })
    }

    async fn len(&self) -> Result<usize, SessionStoreError> {
        Ok(self.sessions.read().await.len())
    }
}
