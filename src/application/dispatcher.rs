//! Dispatcher - message pump feeding the workflow controller.
//!
//! Messages from one user must be handled in delivery order because every
//! turn depends on the state the previous one left. The dispatcher gives
//! each active user a sequential worker fed by its own bounded queue, lets
//! workers of different users run in parallel, and bounds the number of
//! turns in flight with a semaphore.
//!
//! ## Backpressure
//!
//! When a user's queue is full the dispatcher waits for room before reading
//! the next inbound message, so a flooding user fills the inbound channel
//! and stalls its producer instead of growing memory.
//!
//! ## Graceful Shutdown
//!
//! On a shutdown signal, or when the inbound channel closes, the dispatcher
//! stops accepting messages, lets every worker drain what is already queued,
//! and returns once they have all finished.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{TurnOutcome, WorkflowController};
use crate::config::DispatchConfig;
use crate::domain::foundation::UserId;
use crate::domain::message::InboundMessage;
use crate::domain::session::UserInputs;
use crate::ports::MessageSender;

/// Counters reported when the dispatcher stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Messages handed to workers.
    pub dispatched: usize,
    /// Workflows that reached a terminal step.
    pub completed: usize,
}

struct Worker {
    queue: mpsc::Sender<InboundMessage>,
    pending: Arc<AtomicUsize>,
}

/// Everything a worker task needs, shared across workers.
#[derive(Clone)]
struct Shared {
    controller: Arc<WorkflowController>,
    sender: Arc<dyn MessageSender>,
    permits: Arc<Semaphore>,
    completions: Option<mpsc::Sender<UserInputs>>,
    completed: Arc<AtomicUsize>,
    user_queue: usize,
}

/// Routes inbound messages to per-user sequential workers.
pub struct Dispatcher {
    shared: Shared,
}

impl Dispatcher {
    pub fn new(
        controller: Arc<WorkflowController>,
        sender: Arc<dyn MessageSender>,
        config: &DispatchConfig,
    ) -> Self {
        Self {
            shared: Shared {
                controller,
                sender,
                permits: Arc::new(Semaphore::new(config.max_concurrent_turns)),
                completions: None,
                completed: Arc::new(AtomicUsize::new(0)),
                user_queue: config.user_queue,
            },
        }
    }

    /// Forwards the answers of every completed workflow to `completions`.
    pub fn with_completions(mut self, completions: mpsc::Sender<UserInputs>) -> Self {
        self.shared.completions = Some(completions);
        self
    }

    /// Runs until `inbound` closes or `shutdown` turns true.
    pub async fn run(
        self,
        mut inbound: mpsc::Receiver<InboundMessage>,
        mut shutdown: watch::Receiver<bool>,
    ) -> DispatchSummary {
        let (idle_tx, mut idle_rx) = mpsc::unbounded_channel::<UserId>();
        let mut workers: HashMap<UserId, Worker> = HashMap::new();
        let mut tasks = JoinSet::new();
        let mut dispatched = 0;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("dispatcher shutting down");
                        break;
                    }
                }

                message = inbound.recv() => {
                    let Some(message) = message else {
                        debug!("inbound channel closed");
                        break;
                    };
                    let user = message.user_id();
                    let worker = workers
                        .entry(user)
                        .or_insert_with(|| spawn_worker(&mut tasks, user, &self.shared, idle_tx.clone()));
                    worker.pending.fetch_add(1, Ordering::SeqCst);
                    let queue = worker.queue.clone();

                    let queued = tokio::select! {
                        queued = queue.send(message) => queued,
                        _ = shutdown_requested(&mut shutdown) => {
                            info!(user_id = %user, "dispatcher shutting down while user queue full");
                            break;
                        }
                    };
                    if let Err(mpsc::error::SendError(message)) = queued {
                        // Worker task died; start a fresh one for this user.
                        warn!(user_id = %user, "worker gone, respawning");
                        let worker = spawn_worker(&mut tasks, user, &self.shared, idle_tx.clone());
                        worker.pending.fetch_add(1, Ordering::SeqCst);
                        if worker.queue.try_send(message).is_err() {
                            warn!(user_id = %user, "dropping message for respawned worker");
                        }
                        workers.insert(user, worker);
                    }
                    dispatched += 1;
                }

                Some(user) = idle_rx.recv() => {
                    let retire = workers
                        .get(&user)
                        .is_some_and(|w| w.pending.load(Ordering::SeqCst) == 0);
                    if retire {
                        workers.remove(&user);
                        debug!(user_id = %user, "retired idle worker");
                    }
                }

                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Closing the queues lets workers finish what they already hold.
        workers.clear();
        while tasks.join_next().await.is_some() {}

        DispatchSummary {
            dispatched,
            completed: self.shared.completed.load(Ordering::SeqCst),
        }
    }
}

/// Resolves once `shutdown` turns true or its sender goes away.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if shutdown.changed().await.is_err() || *shutdown.borrow() {
            return;
        }
    }
}

fn spawn_worker(
    tasks: &mut JoinSet<()>,
    user: UserId,
    shared: &Shared,
    idle: mpsc::UnboundedSender<UserId>,
) -> Worker {
    let (queue, mut rx) = mpsc::channel::<InboundMessage>(shared.user_queue.max(1));
    let pending = Arc::new(AtomicUsize::new(0));
    let shared = shared.clone();
    let counter = Arc::clone(&pending);

    tasks.spawn(async move {
        while let Some(message) = rx.recv().await {
            let Ok(permit) = Arc::clone(&shared.permits).acquire_owned().await else {
                break;
            };
            let outcome = shared
                .controller
                .execute(&message, shared.sender.as_ref())
                .await;
            drop(permit);

            if let TurnOutcome::Completed(inputs) = outcome {
                shared.completed.fetch_add(1, Ordering::SeqCst);
                if let Some(completions) = &shared.completions {
                    if completions.send(inputs).await.is_err() {
                        debug!(user_id = %user, "completion receiver dropped");
                    }
                }
            }

            if counter.fetch_sub(1, Ordering::SeqCst) == 1 {
                let _ = idle.send(user);
            }
        }
    });

    Worker { queue, pending }
}
