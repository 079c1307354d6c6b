//! Workflow definitions: steps, edges, and the strategies attached to them.

mod cancel;
mod command;
mod graph;
mod step;
mod strategy;
#[allow(clippy::module_inception)]
mod workflow;

pub use cancel::CancelButton;
pub use command::Command;
pub use graph::{StepGraph, Successor, WorkflowBuilder, WorkflowError};
pub use step::{Branch, Step, StepId};
pub use strategy::{
    BranchStrategy, InputValidator, KeyboardValidator, LiteralBranch, PromptRenderer, Validation,
};
pub use workflow::Workflow;
