//! Pluggable per-step behaviour.
//!
//! Each step may carry a validation, branching, or rendering strategy. Any
//! closure with the right signature is a strategy, so simple workflows never
//! have to name these traits:
//!
//! ```ignore
//! Step::new("Temperature", "temp", "Pick a temperature")
//!     .with_validator(|msg: &InboundMessage, _: Option<&Keyboard>| {
//!         match msg.text.parse::<u8>() {
//!             Ok(16..=30) => Validation::Valid,
//!             _ => Validation::invalid("Enter a number between 16 and 30"),
//!         }
//!     })
//!     .with_renderer(|inputs: &UserInputs| format!("Cooling {}", inputs.get("ac").unwrap_or("?")));
//! ```

use std::collections::{BTreeSet, HashMap};

use crate::domain::message::{InboundMessage, Keyboard};
use crate::domain::session::UserInputs;

/// Outcome of validating one user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    /// `reply` is sent back to the user verbatim.
    Invalid { reply: String },
}

impl Validation {
    pub fn invalid(reply: impl Into<String>) -> Self {
        Validation::Invalid {
            reply: reply.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

/// Decides whether a message is an acceptable answer for a step.
///
/// Receives the step's keyboard (if any) so option-based validators can
/// compare against it.
pub trait InputValidator: Send + Sync {
    fn validate(&self, msg: &InboundMessage, keyboard: Option<&Keyboard>) -> Validation;
}

impl<F> InputValidator for F
where
    F: Fn(&InboundMessage, Option<&Keyboard>) -> Validation + Send + Sync,
{
    fn validate(&self, msg: &InboundMessage, keyboard: Option<&Keyboard>) -> Validation {
        self(msg, keyboard)
    }
}

/// Validator used when neither the step nor the controller supplies one.
///
/// Free text is accepted when there is no keyboard (or an empty one);
/// otherwise the text must equal one of the button labels exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardValidator;

impl InputValidator for KeyboardValidator {
    fn validate(&self, msg: &InboundMessage, keyboard: Option<&Keyboard>) -> Validation {
        match keyboard {
            Some(kb) if !kb.is_empty() && !kb.contains(&msg.text) => {
                Validation::invalid(format!("Invalid input {}. Please try again", msg.text))
            }
            _ => Validation::Valid,
        }
    }
}

/// Maps an accepted input to the key of the branch to follow.
pub trait BranchStrategy: Send + Sync {
    fn select(&self, msg: &InboundMessage) -> String;

    /// Every key `select` can return, when known.
    ///
    /// Declaring outcomes lets the workflow builder reject branch tables
    /// that miss one of them.
    fn outcomes(&self) -> Option<Vec<String>> {
        None
    }
}

impl<F> BranchStrategy for F
where
    F: Fn(&InboundMessage) -> String + Send + Sync,
{
    fn select(&self, msg: &InboundMessage) -> String {
        self(msg)
    }
}

/// Branch strategy that routes on the exact input text.
///
/// Inputs with no route select the fallback key, or the empty key when no
/// fallback is set. The empty key is never declared as an outcome, so an
/// unrouted input on a step without fallback fails branch resolution.
#[derive(Debug, Clone, Default)]
pub struct LiteralBranch {
    routes: HashMap<String, String>,
    fallback: Option<String>,
}

impl LiteralBranch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `input` to branch `key`.
    pub fn route(mut self, input: impl Into<String>, key: impl Into<String>) -> Self {
        self.routes.insert(input.into(), key.into());
        self
    }

    /// Branch key for inputs without a route.
    pub fn otherwise(mut self, key: impl Into<String>) -> Self {
        self.fallback = Some(key.into());
        self
    }
}

impl BranchStrategy for LiteralBranch {
    fn select(&self, msg: &InboundMessage) -> String {
        self.routes
            .get(&msg.text)
            .or(self.fallback.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    fn outcomes(&self) -> Option<Vec<String>> {
        let keys: BTreeSet<&String> = self.routes.values().chain(self.fallback.iter()).collect();
        Some(keys.into_iter().cloned().collect())
    }
}

/// Produces prompt text from the answers collected so far.
pub trait PromptRenderer: Send + Sync {
    fn render(&self, inputs: &UserInputs) -> String;
}

impl<F> PromptRenderer for F
where
    F: Fn(&UserInputs) -> String + Send + Sync,
{
    fn render(&self, inputs: &UserInputs) -> String {
        self(inputs)
    }
}
