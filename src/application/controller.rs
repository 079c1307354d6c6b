//! WorkflowController - runs registered workflows one message at a time.
//!
//! For every inbound message the controller resolves the workflow or
//! session it belongs to, checks for cancellation, validates the input,
//! advances the session, and sends exactly one reply. Session state is
//! committed to the store before the reply goes out, so a failed send never
//! rolls back progress.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn, Instrument};

use super::{TurnOutcome, UserGate};
use crate::config::EngineConfig;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::message::{InboundMessage, OutboundReply, ParseMode, ReplyMarkup};
use crate::domain::session::{Session, SessionStatus};
use crate::domain::workflow::{
    Command, InputValidator, KeyboardValidator, Successor, Validation, Workflow,
};
use crate::ports::{MessageSender, SessionStore};

/// Produces the reply for messages no workflow can handle.
pub trait NotFoundReply: Send + Sync {
    fn reply_text(&self, msg: &InboundMessage) -> String;
}

impl<F> NotFoundReply for F
where
    F: Fn(&InboundMessage) -> String + Send + Sync,
{
    fn reply_text(&self, msg: &InboundMessage) -> String {
        self(msg)
    }
}

/// Default text for unknown commands and session-less messages.
fn default_not_found(text: &str) -> String {
    format!(
        "Message \"{}\" cannot be processed. Please select valid command.",
        text
    )
}

fn broken_workflow(workflow: &str, step: &str) -> String {
    format!(
        "Workflow {} broken. Cannot determine next step for CurrentStep: {}",
        workflow, step
    )
}

/// Registry of workflows plus the engine that drives sessions through them.
///
/// # Example
///
/// ```ignore
/// let controller = WorkflowController::new("ac-bot", Arc::new(InMemorySessionStore::new()))
///     .with_parse_mode(ParseMode::MarkdownV2)
///     .with_not_found_reply(|msg: &InboundMessage| format!("Try /ac_control, not {}", msg.text));
/// controller.register(ac_workflow).await;
///
/// if let TurnOutcome::Completed(inputs) = controller.execute(&msg, &sender).await {
///     apply(inputs);
/// }
/// ```
pub struct WorkflowController {
    name: String,
    workflows: RwLock<HashMap<Command, Arc<Workflow>>>,
    store: Arc<dyn SessionStore>,
    gate: UserGate,
    not_found: Option<Arc<dyn NotFoundReply>>,
    validator: Option<Arc<dyn InputValidator>>,
    parse_mode: ParseMode,
}

impl WorkflowController {
    pub fn new(name: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            name: name.into(),
            workflows: RwLock::new(HashMap::new()),
            store,
            gate: UserGate::new(),
            not_found: None,
            validator: None,
            parse_mode: ParseMode::default(),
        }
    }

    /// Builds a controller named and configured by `config`.
    pub fn from_config(config: &EngineConfig, store: Arc<dyn SessionStore>) -> Self {
        Self::new(config.name.clone(), store).with_parse_mode(config.parse_mode)
    }

    /// Replaces the default "cannot be processed" reply.
    pub fn with_not_found_reply(mut self, reply: impl NotFoundReply + 'static) -> Self {
        self.not_found = Some(Arc::new(reply));
        self
    }

    /// Validator for steps that do not bring their own.
    pub fn with_validator(mut self, validator: impl InputValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parse_mode(&self) -> ParseMode {
        self.parse_mode
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Turn lock shared with anything else that mutates sessions.
    pub fn gate(&self) -> &UserGate {
        &self.gate
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────────────────────

    /// Registers `workflow` under its command, replacing and returning any
    /// workflow previously registered for it.
    ///
    /// Sessions already running the replaced workflow finish on its graph.
    pub async fn register(&self, workflow: Workflow) -> Option<Arc<Workflow>> {
        let unreachable = workflow.graph().unreachable_steps();
        if !unreachable.is_empty() {
            warn!(
                controller = %self.name,
                workflow = workflow.name(),
                steps = ?unreachable,
                "workflow has steps no path reaches"
            );
        }

        let command = workflow.command().clone();
        info!(
            controller = %self.name,
            workflow = workflow.name(),
            command = %command,
            "registered workflow"
        );
        self.workflows
            .write()
            .await
            .insert(command, Arc::new(workflow))
    }

    /// Snapshot of `user`'s running session. Store errors read as none.
    pub async fn session(&self, user: UserId) -> Option<Session> {
        self.store.get(user).await.ok().flatten()
    }

    pub async fn workflow(&self, command: &Command) -> Option<Arc<Workflow>> {
        self.workflows.read().await.get(command).cloned()
    }

    /// Registered commands, sorted.
    pub async fn commands(&self) -> Vec<Command> {
        let mut commands: Vec<Command> = self.workflows.read().await.keys().cloned().collect();
        commands.sort();
        commands
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Turn handling
    // ─────────────────────────────────────────────────────────────────────────

    /// Handles one inbound message and sends its reply through `sender`.
    ///
    /// Turns of the same user are serialized; turns of different users run
    /// concurrently. Never panics on bad input or store/transport failures:
    /// everything is reported through the returned [`TurnOutcome`].
    pub async fn execute(&self, msg: &InboundMessage, sender: &dyn MessageSender) -> TurnOutcome {
        let span = tracing::debug_span!(
            "turn",
            controller = %self.name,
            user_id = %msg.user_id(),
            message_id = %msg.message_id,
        );
        async {
            let _turn = self.gate.acquire(msg.user_id()).await;
            self.turn(msg, sender).await
        }
        .instrument(span)
        .await
    }

    async fn turn(&self, msg: &InboundMessage, sender: &dyn MessageSender) -> TurnOutcome {
        let user = msg.user_id();
        debug!(text = %msg.text, username = msg.username(), "received message");

        let reply = OutboundReply::responding_to(msg, self.parse_mode);

        let (mut session, is_command) = match msg.command() {
            Some(raw) => {
                let command = Command::new(raw);
                let Some(workflow) = self.workflow(&command).await else {
                    info!(command = %command, "no workflow registered for command");
                    let text = self.not_found_text(msg, command.as_str());
                    self.deliver(sender, reply.with_text(text)).await;
                    return TurnOutcome::Unrecognized;
                };
                debug!(
                    workflow = workflow.name(),
                    command = %command,
                    "starting workflow"
                );
                (Session::start(user, &workflow), true)
            }
            None => match self.store.get(user).await {
                Ok(Some(session)) => (session, false),
                Ok(None) => {
                    debug!("no active session");
                    let text = self.not_found_text(msg, &msg.text);
                    self.deliver(sender, reply.with_text(text).removing_keyboard())
                        .await;
                    return TurnOutcome::Unrecognized;
                }
                Err(e) => {
                    error!(error = %e, "failed loading session");
                    return TurnOutcome::Failed;
                }
            },
        };

        if let Some(cancel) = session
            .cancel_button()
            .filter(|button| button.matches(&msg.text))
            .cloned()
        {
            self.end(&mut session, SessionStatus::Cancelled);
            if let Err(e) = self.store.delete(user).await {
                error!(error = %e, "failed removing cancelled session");
                return TurnOutcome::Failed;
            }
            self.deliver(sender, reply.with_text(cancel.reply()).removing_keyboard())
                .await;
            return TurnOutcome::Cancelled;
        }

        if !is_command {
            if let Validation::Invalid { reply: text } = self.validate(msg, &session) {
                let step = session.current_step().name().to_string();
                debug!(step = %step, input = %msg.text, "input rejected");
                self.deliver(sender, reply.with_text(text).removing_keyboard())
                    .await;
                return TurnOutcome::Rejected { step };
            }

            session.record_answer(&msg.text);

            let from = session.current_step().name().to_string();
            match session.advance(msg) {
                Successor::Next(_) => {
                    debug!(from = %from, to = session.current_step().name(), "advanced");
                }
                Successor::End => {}
                Successor::Unresolved { key } => {
                    warn!(
                        workflow = session.workflow_name(),
                        step = %from,
                        branch_key = %key,
                        "branch key has no target step"
                    );
                    let text = broken_workflow(session.workflow_name(), &from);
                    self.end(&mut session, SessionStatus::Aborted);
                    if let Err(e) = self.store.delete(user).await {
                        error!(error = %e, "failed removing aborted session");
                        return TurnOutcome::Failed;
                    }
                    self.deliver(sender, reply.with_text(text).removing_keyboard())
                        .await;
                    return TurnOutcome::Aborted { step: from };
                }
            }
        }

        let done = session.is_at_terminal();
        let step = session.current_step();
        let step_name = step.name().to_string();
        let markup = match step.keyboard() {
            Some(keyboard) if !done => ReplyMarkup::Keyboard(keyboard.clone()),
            _ => ReplyMarkup::remove_keyboard(),
        };
        let reply = reply
            .with_text(step.render(session.inputs()))
            .with_markup(markup);

        session.touch(Timestamp::now());

        if done {
            self.end(&mut session, SessionStatus::Completed);
            if let Err(e) = self.store.delete(user).await {
                error!(error = %e, "failed removing completed session");
                return TurnOutcome::Failed;
            }
            self.deliver(sender, reply).await;
            info!(
                workflow = session.workflow_name(),
                answers = session.inputs().len(),
                "workflow completed"
            );
            return TurnOutcome::Completed(session.into_inputs());
        }

        if let Err(e) = self.store.put(session).await {
            error!(error = %e, "failed saving session");
            return TurnOutcome::Failed;
        }
        self.deliver(sender, reply).await;
        TurnOutcome::Prompted { step: step_name }
    }

    /// Step validator, else controller validator, else keyboard matching.
    fn validate(&self, msg: &InboundMessage, session: &Session) -> Validation {
        let step = session.current_step();
        let keyboard = step.keyboard();
        match (step.validator(), &self.validator) {
            (Some(validator), _) => validator.validate(msg, keyboard),
            (None, Some(validator)) => validator.validate(msg, keyboard),
            (None, None) => KeyboardValidator.validate(msg, keyboard),
        }
    }

    fn not_found_text(&self, msg: &InboundMessage, text: &str) -> String {
        match &self.not_found {
            Some(reply) => reply.reply_text(msg),
            None => default_not_found(text),
        }
    }

    fn end(&self, session: &mut Session, status: SessionStatus) {
        match session.finish(status) {
            Ok(()) => debug!(session_id = %session.id(), status = %status, "session ended"),
            Err(e) => warn!(session_id = %session.id(), error = %e, "session already ended"),
        }
    }

    async fn deliver(&self, sender: &dyn MessageSender, reply: OutboundReply) {
        if let Err(e) = sender.send(reply).await {
            warn!(error = %e, "failed sending reply");
        }
    }
}
