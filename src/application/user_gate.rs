//! Per-user turn serialization.
//!
//! A turn reads a session, mutates it and writes it back. The session store
//! makes each of those atomic on its own; the gate makes the whole sequence
//! atomic per user while turns of different users run in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::UserId;

/// Lock entries kept before idle ones are pruned.
const PRUNE_THRESHOLD: usize = 1024;

/// Holds the turn lock for one user until dropped.
pub type UserTurn = OwnedMutexGuard<()>;

/// Map of per-user async locks. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct UserGate {
    locks: Arc<Mutex<HashMap<UserId, Arc<Mutex<()>>>>>,
}

impl UserGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for `user`'s previous turn to finish and claims the next one.
    pub async fn acquire(&self, user: UserId) -> UserTurn {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() >= PRUNE_THRESHOLD {
                prune(&mut locks);
            }
            Arc::clone(locks.entry(user).or_default())
        };
        lock.lock_owned().await
    }

    /// Drops locks nobody holds or waits on.
    pub async fn prune(&self) {
        prune(&mut *self.locks.lock().await);
    }

    /// Number of users with a lock entry.
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn prune(locks: &mut HashMap<UserId, Arc<Mutex<()>>>) {
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
}
