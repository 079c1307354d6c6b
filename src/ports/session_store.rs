//! Session store port.
//!
//! Owns every live [`Session`], keyed by user. Each operation is atomic on
//! its own; a caller that reads, mutates and writes back a session must hold
//! the user's turn lock (see `application::UserGate`) for the whole sequence.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::session::Session;

/// Concurrency-safe mapping from user to their active session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns a snapshot of the user's session, if any.
    async fn get(&self, user_id: UserId) -> Result<Option<Session>, SessionStoreError>;

    /// Stores `session` under its user, returning the one it replaced.
    async fn put(&self, session: Session) -> Result<Option<Session>, SessionStoreError>;

    /// Removes and returns the user's session.
    async fn delete(&self, user_id: UserId) -> Result<Option<Session>, SessionStoreError>;

    /// Users whose session has been idle for longer than `ttl` at `now`.
    async fn idle_users(&self, ttl: Duration, now: Timestamp)
        -> Result<Vec<UserId>, SessionStoreError>;

    /// Removes and returns the user's session only if it is still idle.
    ///
    /// Callers hold the user's turn lock, so a turn that refreshed the
    /// session after `idle_users` ran keeps it.
    async fn remove_idle(
        &self,
        user_id: UserId,
        ttl: Duration,
        now: Timestamp,
    ) -> Result<Option<Session>, SessionStoreError>;

    /// Number of live sessions.
    async fn len(&self) -> Result<usize, SessionStoreError>;
}

/// Errors that can occur in session store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    /// Backing storage cannot be reached.
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

impl From<SessionStoreError> for DomainError {
    fn from(err: SessionStoreError) -> Self {
        DomainError::new(ErrorCode::SessionStoreError, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SessionStore) {}
    }

    #[test]
    fn store_error_maps_to_domain_code() {
        let err: DomainError = SessionStoreError::Unavailable("down".into()).into();
        assert_eq!(err.code, ErrorCode::SessionStoreError);
        assert!(err.message.contains("down"));
        assert!(err.details.is_empty());
    }
}
