//! A user's live position inside one workflow run.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, SessionId, StateMachine, Timestamp, UserId};
use crate::domain::message::InboundMessage;
use crate::domain::workflow::{CancelButton, Command, Step, StepGraph, StepId, Successor, Workflow};

use super::{SessionStatus, UserInputs};

/// One workflow run for one user.
///
/// # Invariants
///
/// - `current` always indexes into `graph`
/// - `status` is `Active` for as long as the session is stored
/// - answers are only ever added under non-empty step keys
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    user_id: UserId,
    workflow_name: String,
    graph: Arc<StepGraph>,
    current: StepId,
    inputs: UserInputs,
    cancel: Option<CancelButton>,
    status: SessionStatus,
    started_at: Timestamp,
    last_activity: Timestamp,
}

impl Session {
    /// Starts a fresh run of `workflow` at its root step.
    pub fn start(user_id: UserId, workflow: &Workflow) -> Self {
        Self::start_at(user_id, workflow, Timestamp::now())
    }

    pub fn start_at(user_id: UserId, workflow: &Workflow, now: Timestamp) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            workflow_name: workflow.name().to_string(),
            graph: Arc::clone(workflow.graph()),
            current: workflow.graph().root(),
            inputs: UserInputs::new(user_id, workflow.command().clone()),
            cancel: workflow.cancel_button().cloned(),
            status: SessionStatus::Active,
            started_at: now,
            last_activity: now,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    pub fn command(&self) -> &Command {
        self.inputs.command()
    }

    pub fn current(&self) -> StepId {
        self.current
    }

    pub fn current_step(&self) -> &Step {
        self.graph.step(self.current)
    }

    pub fn inputs(&self) -> &UserInputs {
        &self.inputs
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    pub fn last_activity(&self) -> &Timestamp {
        &self.last_activity
    }

    /// Effective cancel button: the current step's override, else the
    /// workflow default.
    pub fn cancel_button(&self) -> Option<&CancelButton> {
        self.current_step()
            .cancel_button()
            .or(self.cancel.as_ref())
    }

    pub fn is_at_terminal(&self) -> bool {
        self.current_step().is_terminal()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Turn mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Records `text` as the answer to the current step, if it has a key.
    pub fn record_answer(&mut self, text: &str) -> bool {
        let key = self.graph.step(self.current).key().to_string();
        self.inputs.record(key, text)
    }

    /// Moves along the outgoing edge of the current step.
    ///
    /// Stays put when the step is terminal or the branch key is unknown;
    /// the returned [`Successor`] says which happened.
    pub fn advance(&mut self, msg: &InboundMessage) -> Successor {
        let successor = self.graph.successor(self.current, msg);
        if let Successor::Next(next) = successor {
            self.current = next;
        }
        successor
    }

    pub fn touch(&mut self, now: Timestamp) {
        self.last_activity = now;
    }

    /// True when the session has been idle for longer than `ttl` at `now`.
    pub fn is_idle(&self, ttl: std::time::Duration, now: &Timestamp) -> bool {
        self.last_activity.elapsed_at(now) > ttl
    }

    /// Ends the session with a terminal status.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the session already ended
    pub fn finish(&mut self, status: SessionStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(status)?;
        Ok(())
    }

    pub fn into_inputs(self) -> UserInputs {
        self.inputs
    }
}
