//! SessionReaper - background eviction of abandoned sessions.
//!
//! A user who stops answering leaves their session in the store forever.
//! The reaper periodically removes sessions idle longer than a TTL. Each
//! removal happens under the user's turn lock, so a turn already working on
//! the session either finishes first (and refreshes it) or never sees it.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `idle_ttl` | none | Reaper is not started without it |
//! | `sweep_interval` | 60s | How often to look for idle sessions |

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, error, info};

use crate::config::SessionsConfig;
use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::session::{Session, SessionStatus};
use super::{UserGate, WorkflowController};
use crate::ports::SessionStore;

/// Background service that evicts idle sessions.
pub struct SessionReaper {
    store: Arc<dyn SessionStore>,
    gate: UserGate,
    ttl: Duration,
    sweep_interval: Duration,
}

impl SessionReaper {
    pub fn new(
        store: Arc<dyn SessionStore>,
        gate: UserGate,
        ttl: Duration,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            store,
            gate,
            ttl,
            sweep_interval,
        }
    }

    /// Builds a reaper over `controller`'s sessions when `config` enables
    /// eviction.
    pub fn from_config(controller: &WorkflowController, config: &SessionsConfig) -> Option<Self> {
        config.idle_ttl().map(|ttl| {
            Self::new(
                Arc::clone(controller.store()),
                controller.gate().clone(),
                ttl,
                config.sweep_interval(),
            )
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Run the sweep loop until shutdown signal is received.
    ///
    /// Store failures are logged and retried on the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.sweep_interval);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.sweep().await {
                        error!(error = %e, "session sweep failed");
                    }
                }
            }
        }
    }

    /// Evicts sessions idle at this moment.
    pub async fn sweep(&self) -> Result<Vec<Session>, DomainError> {
        self.sweep_at(Timestamp::now()).await
    }

    /// Evicts sessions idle at `now` and returns them marked `Evicted`.
    pub async fn sweep_at(&self, now: Timestamp) -> Result<Vec<Session>, DomainError> {
        let candidates = self.store.idle_users(self.ttl, now).await?;
        let mut evicted = Vec::with_capacity(candidates.len());

        for user in candidates {
            let _turn = self.gate.acquire(user).await;
            let Some(mut session) = self.store.remove_idle(user, self.ttl, now).await? else {
                debug!(user_id = %user, "session active again, kept");
                continue;
            };

            session.finish(SessionStatus::Evicted)?;
            info!(
                user_id = %session.user_id(),
                session_id = %session.id(),
                workflow = session.workflow_name(),
                step = session.current_step().name(),
                idle_secs = session.last_activity().elapsed_at(&now).as_secs(),
                "evicted idle session"
            );
            evicted.push(session);
        }

        Ok(evicted)
    }
}
