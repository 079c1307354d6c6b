//! A single node of a workflow graph.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{BranchStrategy, CancelButton, InputValidator, PromptRenderer};
use crate::domain::message::Keyboard;
use crate::domain::session::UserInputs;

/// Stable handle of a step inside its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub(crate) usize);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Conditional outgoing edges of a step.
#[derive(Clone)]
pub struct Branch {
    pub(crate) strategy: Arc<dyn BranchStrategy>,
    pub(crate) table: HashMap<String, StepId>,
}

impl Branch {
    pub fn strategy(&self) -> &dyn BranchStrategy {
        self.strategy.as_ref()
    }

    /// Step selected by `key`, if the table has one.
    pub fn target(&self, key: &str) -> Option<StepId> {
        self.table.get(key).copied()
    }
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("outcomes", &self.strategy.outcomes())
            .field("table", &self.table)
            .finish()
    }
}

/// One prompt in a workflow, optionally capturing one answer.
///
/// Edges (`next`, `branch`) are wired by [`super::WorkflowBuilder`]; a step
/// with neither is terminal.
#[derive(Clone)]
pub struct Step {
    name: String,
    key: String,
    prompt: String,
    keyboard: Option<Keyboard>,
    renderer: Option<Arc<dyn PromptRenderer>>,
    validator: Option<Arc<dyn InputValidator>>,
    cancel: Option<CancelButton>,
    pub(crate) next: Option<StepId>,
    pub(crate) branch: Option<Branch>,
}

impl Step {
    /// `key` names the answer in the collected inputs; leave it empty for
    /// steps that collect nothing.
    pub fn new(name: impl Into<String>, key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            prompt: prompt.into(),
            keyboard: None,
            renderer: None,
            validator: None,
            cancel: None,
            next: None,
            branch: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Renders the prompt from collected inputs instead of the static text.
    pub fn with_renderer(mut self, renderer: impl PromptRenderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Overrides controller-level and default validation for this step.
    pub fn with_validator(mut self, validator: impl InputValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Overrides the workflow's cancel button while at this step.
    pub fn with_cancel_button(mut self, cancel: CancelButton) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        self.keyboard.as_ref()
    }

    pub fn validator(&self) -> Option<&dyn InputValidator> {
        self.validator.as_deref()
    }

    pub fn cancel_button(&self) -> Option<&CancelButton> {
        self.cancel.as_ref()
    }

    pub fn next(&self) -> Option<StepId> {
        self.next
    }

    pub fn branch(&self) -> Option<&Branch> {
        self.branch.as_ref()
    }

    /// True when the step has neither a successor nor a branch.
    pub fn is_terminal(&self) -> bool {
        self.next.is_none() && self.branch.is_none()
    }

    /// Text shown when the step is entered. The renderer wins over the
    /// static prompt.
    pub fn render(&self, inputs: &UserInputs) -> String {
        match &self.renderer {
            Some(renderer) => renderer.render(inputs),
            None => self.prompt.clone(),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("prompt", &self.prompt)
            .field("keyboard", &self.keyboard)
            .field("has_renderer", &self.renderer.is_some())
            .field("has_validator", &self.validator.is_some())
            .field("cancel", &self.cancel)
            .field("next", &self.next)
            .field("branch", &self.branch)
            .finish()
    }
}
