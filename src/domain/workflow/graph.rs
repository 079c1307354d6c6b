//! Step graph arena and the builder that wires it.
//!
//! Steps are added to a [`WorkflowBuilder`], which hands back [`StepId`]s.
//! Edges are declared by id and checked when the workflow is built; after
//! that the graph is immutable and shared by every session running it.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use thiserror::Error;

use super::{Branch, BranchStrategy, CancelButton, Command, Step, StepId, Workflow};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::message::InboundMessage;

/// Where a step leads after an accepted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Successor {
    /// The step is terminal.
    End,
    Next(StepId),
    /// The branch strategy produced a key missing from the branch table.
    Unresolved { key: String },
}

/// Immutable arena of steps with a designated root.
#[derive(Debug)]
pub struct StepGraph {
    steps: Vec<Step>,
    root: StepId,
}

impl StepGraph {
    pub fn root(&self) -> StepId {
        self.root
    }

    /// Returns the step for an id handed out by this graph's builder.
    pub fn step(&self, id: StepId) -> &Step {
        &self.steps[id.0]
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolves the outgoing edge of `from` for an accepted message.
    ///
    /// A branch, when present, overrides the straight-line successor.
    pub fn successor(&self, from: StepId, msg: &InboundMessage) -> Successor {
        let step = self.step(from);
        if let Some(branch) = step.branch() {
            let key = branch.strategy().select(msg);
            return match branch.target(&key) {
                Some(next) => Successor::Next(next),
                None => Successor::Unresolved { key },
            };
        }
        match step.next() {
            Some(next) => Successor::Next(next),
            None => Successor::End,
        }
    }

    /// Names of steps that no path from the root reaches.
    pub fn unreachable_steps(&self) -> Vec<&str> {
        let mut seen = vec![false; self.steps.len()];
        let mut queue = VecDeque::from([self.root]);
        seen[self.root.0] = true;

        while let Some(id) = queue.pop_front() {
            let step = self.step(id);
            let branch_targets = step.branch().into_iter().flat_map(|b| b.table.values().copied());
            for next in step.next().into_iter().chain(branch_targets) {
                if !seen[next.0] {
                    seen[next.0] = true;
                    queue.push_back(next);
                }
            }
        }

        self.steps
            .iter()
            .zip(seen)
            .filter(|(_, reached)| !reached)
            .map(|(step, _)| step.name())
            .collect()
    }
}

/// Reasons a workflow definition is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Workflow '{workflow}' has an empty command")]
    EmptyCommand { workflow: String },

    #[error("Workflow '{workflow}' has no steps")]
    NoSteps { workflow: String },

    #[error("Workflow '{workflow}' references step {step} which it does not contain")]
    UnknownStep { workflow: String, step: StepId },

    #[error("Step '{step}' has branch targets but no branch strategy")]
    BranchTargetsWithoutStrategy { step: String },

    #[error("Step '{step}' branches but its branch table is empty")]
    EmptyBranchTable { step: String },

    #[error("Step '{step}' can branch to '{key}' but has no target for it")]
    UncoveredBranch { step: String, key: String },
}

impl From<WorkflowError> for DomainError {
    fn from(err: WorkflowError) -> Self {
        DomainError::new(ErrorCode::WorkflowMisconfigured, err.to_string())
    }
}

enum Edge {
    Next(StepId, StepId),
    Strategy(StepId, Arc<dyn BranchStrategy>),
    BranchTarget(StepId, String, StepId),
}

/// Collects steps and edges, then validates them into a [`Workflow`].
///
/// ```ignore
/// let mut wf = WorkflowBuilder::new("ConditionalWF", "cmd2");
/// let ask = wf.step(Step::new("CondStep2", "CondK2", "Pick").with_keyboard(kb));
/// let c1 = wf.step(Step::new("C1Step3", "C1K3", "Pick again"));
/// let c2 = wf.step(Step::new("C2Step3", "C2K3", "Pick again"));
/// wf.branch(ask, LiteralBranch::new().route("A", "C1").route("B", "C2"))
///     .branch_to(ask, "C1", c1)
///     .branch_to(ask, "C2", c2);
/// let workflow = wf.build()?;
/// ```
pub struct WorkflowBuilder {
    name: String,
    command: Command,
    steps: Vec<Step>,
    root: Option<StepId>,
    edges: Vec<Edge>,
    cancel: Option<CancelButton>,
}

impl WorkflowBuilder {
    pub fn new(name: impl Into<String>, command: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            command: Command::new(command),
            steps: Vec::new(),
            root: None,
            edges: Vec::new(),
            cancel: None,
        }
    }

    /// Adds a step. The first step added is the root unless
    /// [`WorkflowBuilder::root`] says otherwise.
    pub fn step(&mut self, step: Step) -> StepId {
        self.steps.push(step);
        StepId(self.steps.len() - 1)
    }

    pub fn root(&mut self, id: StepId) -> &mut Self {
        self.root = Some(id);
        self
    }

    /// Straight-line edge taken after an accepted input at `from`.
    pub fn connect(&mut self, from: StepId, to: StepId) -> &mut Self {
        self.edges.push(Edge::Next(from, to));
        self
    }

    /// Makes `from` a conditional step. Overrides any straight-line edge.
    pub fn branch(&mut self, from: StepId, strategy: impl BranchStrategy + 'static) -> &mut Self {
        self.edges.push(Edge::Strategy(from, Arc::new(strategy)));
        self
    }

    /// Target of `from` when its branch strategy selects `key`.
    pub fn branch_to(&mut self, from: StepId, key: impl Into<String>, to: StepId) -> &mut Self {
        self.edges.push(Edge::BranchTarget(from, key.into(), to));
        self
    }

    /// Workflow-wide cancel button; steps may override it.
    pub fn cancel_button(&mut self, cancel: CancelButton) -> &mut Self {
        self.cancel = Some(cancel);
        self
    }

    /// Validates the definition and freezes it.
    pub fn build(self) -> Result<Workflow, WorkflowError> {
        let WorkflowBuilder {
            name,
            command,
            mut steps,
            root,
            edges,
            cancel,
        } = self;

        if command.is_empty() {
            return Err(WorkflowError::EmptyCommand { workflow: name });
        }
        if steps.is_empty() {
            return Err(WorkflowError::NoSteps { workflow: name });
        }

        let check = |id: StepId| {
            if id.0 < steps.len() {
                Ok(id)
            } else {
                Err(WorkflowError::UnknownStep {
                    workflow: name.clone(),
                    step: id,
                })
            }
        };

        let root = check(root.unwrap_or(StepId(0)))?;

        let mut strategies: HashMap<StepId, Arc<dyn BranchStrategy>> = HashMap::new();
        let mut tables: HashMap<StepId, HashMap<String, StepId>> = HashMap::new();
        let mut nexts: Vec<(StepId, StepId)> = Vec::new();
        for edge in edges {
            match edge {
                Edge::Next(from, to) => nexts.push((check(from)?, check(to)?)),
                Edge::Strategy(from, strategy) => {
                    strategies.insert(check(from)?, strategy);
                }
                Edge::BranchTarget(from, key, to) => {
                    tables.entry(check(from)?).or_default().insert(key, check(to)?);
                }
            }
        }

        for (from, to) in nexts {
            steps[from.0].next = Some(to);
        }

        if let Some(orphan) = tables.keys().find(|from| !strategies.contains_key(from)) {
            return Err(WorkflowError::BranchTargetsWithoutStrategy {
                step: steps[orphan.0].name().to_string(),
            });
        }

        for (from, strategy) in strategies {
            let table = tables.remove(&from).unwrap_or_default();
            let step_name = steps[from.0].name().to_string();
            if table.is_empty() {
                return Err(WorkflowError::EmptyBranchTable { step: step_name });
            }
            if let Some(outcomes) = strategy.outcomes() {
                if let Some(key) = outcomes.into_iter().find(|k| !table.contains_key(k)) {
                    return Err(WorkflowError::UncoveredBranch {
                        step: step_name,
                        key,
                    });
                }
            }
            steps[from.0].branch = Some(Branch { strategy, table });
        }

        Ok(Workflow::new(
            name,
            command,
            Arc::new(StepGraph { steps, root }),
            cancel,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::Keyboard;
    use crate::domain::workflow::LiteralBranch;

    fn msg(text: &str) -> InboundMessage {
        InboundMessage::new(1, 1, 1234, text)
    }

    fn linear() -> Workflow {
        let mut wf = WorkflowBuilder::new("WF", "cmd1");
        let s1 = wf.step(Step::new("Step1", "K1", "Please select an option"));
        let s2 = wf.step(Step::new("Step2", "K2", "Please select another option"));
        let s3 = wf.step(Step::new("Step3", "", "Please verify the selected Options"));
        wf.connect(s1, s2).connect(s2, s3);
        wf.build().unwrap()
    }

    mod building {
        use super::*;

        #[test]
        fn first_step_is_root_by_default() {
            let wf = linear();
            assert_eq!(wf.graph().step(wf.graph().root()).name(), "Step1");
        }

        #[test]
        fn explicit_root_wins() {
            let mut wf = WorkflowBuilder::new("WF", "x");
            let a = wf.step(Step::new("A", "", "a"));
            let b = wf.step(Step::new("B", "", "b"));
            wf.root(b).connect(b, a);
            let wf = wf.build().unwrap();
            assert_eq!(wf.graph().root(), b);
        }

        #[test]
        fn command_is_normalized() {
            assert_eq!(linear().command().as_str(), "CMD1");
        }

        #[test]
        fn rejects_empty_command() {
            let mut wf = WorkflowBuilder::new("WF", "/");
            wf.step(Step::new("A", "", "a"));
            assert!(matches!(wf.build(), Err(WorkflowError::EmptyCommand { .. })));
        }

        #[test]
        fn rejects_workflow_without_steps() {
            let wf = WorkflowBuilder::new("WF", "x");
            assert!(matches!(wf.build(), Err(WorkflowError::NoSteps { .. })));
        }

        #[test]
        fn rejects_foreign_step_ids() {
            let mut other = WorkflowBuilder::new("Other", "y");
            other.step(Step::new("A", "", "a"));
            let foreign = other.step(Step::new("B", "", "b"));

            let mut wf = WorkflowBuilder::new("WF", "x");
            let a = wf.step(Step::new("A", "", "a"));
            wf.connect(a, foreign);
            assert!(matches!(wf.build(), Err(WorkflowError::UnknownStep { .. })));
        }

        #[test]
        fn rejects_branch_targets_without_strategy() {
            let mut wf = WorkflowBuilder::new("WF", "x");
            let a = wf.step(Step::new("A", "k", "a"));
            let b = wf.step(Step::new("B", "", "b"));
            wf.branch_to(a, "go", b);
            assert_eq!(
                wf.build().unwrap_err(),
                WorkflowError::BranchTargetsWithoutStrategy { step: "A".into() }
            );
        }

        #[test]
        fn rejects_strategy_without_targets() {
            let mut wf = WorkflowBuilder::new("WF", "x");
            let a = wf.step(Step::new("A", "k", "a"));
            wf.branch(a, |_: &InboundMessage| "go".to_string());
            assert_eq!(
                wf.build().unwrap_err(),
                WorkflowError::EmptyBranchTable { step: "A".into() }
            );
        }

        #[test]
        fn rejects_declared_outcome_without_target() {
            let mut wf = WorkflowBuilder::new("WF", "x");
            let a = wf.step(Step::new("A", "k", "a"));
            let b = wf.step(Step::new("B", "", "b"));
            wf.branch(a, LiteralBranch::new().route("yes", "Y").route("no", "N"))
                .branch_to(a, "Y", b);
            assert_eq!(
                wf.build().unwrap_err(),
                WorkflowError::UncoveredBranch {
                    step: "A".into(),
                    key: "N".into()
                }
            );
        }

        #[test]
        fn workflow_error_converts_to_domain_error() {
            let err: DomainError = WorkflowError::NoSteps { workflow: "WF".into() }.into();
            assert_eq!(err.code, ErrorCode::WorkflowMisconfigured);
        }
    }

    mod traversal {
        use super::*;

        fn conditional() -> (Workflow, StepId, StepId, StepId, StepId) {
            let mut wf = WorkflowBuilder::new("ConditionalWF", "cmd2");
            let cond = wf.step(
                Step::new("CondStep2", "CondK2", "Please select a condition")
                    .with_keyboard(Keyboard::new().row(["Step2Condition1", "Step2Condition2"])),
            );
            let c1 = wf.step(Step::new("C1Step3", "C1K3", "Please select an option"));
            let c2 = wf.step(Step::new("C2Step3", "C2K3", "Please select an option"));
            let end = wf.step(Step::new("Step4", "", "Please verify the selected Options"));
            wf.branch(
                cond,
                LiteralBranch::new()
                    .route("Step2Condition1", "C1")
                    .route("Step2Condition2", "C2"),
            )
            .branch_to(cond, "C1", c1)
            .branch_to(cond, "C2", c2)
            .connect(c1, end)
            .connect(c2, end);
            (wf.build().unwrap(), cond, c1, c2, end)
        }

        #[test]
        fn straight_line_successor() {
            let wf = linear();
            let root = wf.graph().root();
            assert!(matches!(
                wf.graph().successor(root, &msg("anything")),
                Successor::Next(_)
            ));
        }

        #[test]
        fn terminal_step_has_no_successor() {
            let wf = linear();
            assert_eq!(wf.graph().successor(StepId(2), &msg("x")), Successor::End);
        }

        #[test]
        fn branch_selects_target_by_key() {
            let (wf, cond, c1, c2, _) = conditional();
            assert_eq!(
                wf.graph().successor(cond, &msg("Step2Condition1")),
                Successor::Next(c1)
            );
            assert_eq!(
                wf.graph().successor(cond, &msg("Step2Condition2")),
                Successor::Next(c2)
            );
        }

        #[test]
        fn unknown_branch_key_is_unresolved() {
            let (wf, cond, ..) = conditional();
            assert_eq!(
                wf.graph().successor(cond, &msg("Other")),
                Successor::Unresolved { key: String::new() }
            );
        }

        #[test]
        fn branches_converge_on_shared_tail() {
            let (wf, _, c1, c2, end) = conditional();
            assert_eq!(wf.graph().successor(c1, &msg("x")), Successor::Next(end));
            assert_eq!(wf.graph().successor(c2, &msg("x")), Successor::Next(end));
            assert!(wf.graph().step(end).is_terminal());
        }

        #[test]
        fn branch_overrides_straight_line_edge() {
            let mut wf = WorkflowBuilder::new("WF", "x");
            let a = wf.step(Step::new("A", "k", "a"));
            let b = wf.step(Step::new("B", "", "b"));
            let c = wf.step(Step::new("C", "", "c"));
            wf.connect(a, b)
                .branch(a, |_: &InboundMessage| "c".to_string())
                .branch_to(a, "c", c);
            let wf = wf.build().unwrap();
            assert_eq!(wf.graph().successor(a, &msg("x")), Successor::Next(c));
        }

        #[test]
        fn unreachable_steps_are_reported() {
            let mut wf = WorkflowBuilder::new("WF", "x");
            let a = wf.step(Step::new("A", "k", "a"));
            let b = wf.step(Step::new("B", "", "b"));
            wf.step(Step::new("Orphan", "", "o"));
            wf.connect(a, b);
            let wf = wf.build().unwrap();
            assert_eq!(wf.graph().unreachable_steps(), vec!["Orphan"]);
        }

        #[test]
        fn all_steps_reachable_in_conditional_workflow() {
            let (wf, ..) = conditional();
            assert!(wf.graph().unreachable_steps().is_empty());
            assert_eq!(wf.graph().len(), 4);
        }
    }
}
