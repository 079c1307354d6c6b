//! A named, command-triggered workflow definition.

use std::sync::Arc;

use super::{CancelButton, Command, StepGraph};

/// Immutable workflow ready to be registered with a controller.
///
/// Cloning is cheap: the step graph is shared.
#[derive(Debug, Clone)]
pub struct Workflow {
    name: String,
    command: Command,
    graph: Arc<StepGraph>,
    cancel: Option<CancelButton>,
}

impl Workflow {
    pub(crate) fn new(
        name: String,
        command: Command,
        graph: Arc<StepGraph>,
        cancel: Option<CancelButton>,
    ) -> Self {
        Self {
            name,
            command,
            graph,
            cancel,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn graph(&self) -> &Arc<StepGraph> {
        &self.graph
    }

    /// Workflow-wide cancel button.
    pub fn cancel_button(&self) -> Option<&CancelButton> {
        self.cancel.as_ref()
    }
}
