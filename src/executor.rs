//! Executes compiled graphs against input data.

use crate::error::{Error, ExecuteError};
use crate::expr::Value;
use crate::graph::Graph;
use crate::node::{Node, NodeKind};
use crate::step::{Body, BoolOp};
use ahash::{AHashMap, AHashSet};
use serde_json::Value as Json;
use std::collections::VecDeque;
use std::fmt;

/// Completion state of a single workflow step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum State {
    #[default]
    Inactive,
    Active,
    Complete,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Inactive => write!(f, "inactive"),
            State::Active => write!(f, "active"),
            State::Complete => write!(f, "complete"),
        }
    }
}

/// Raw workflow input: a JSON object.
pub type Input = serde_json::Map<String, Json>;

/// A flattened view of the input keyed by dotted paths, e.g.
/// `input.group.id -> "test"`. This is the evaluation environment handed
/// to compiled check expressions.
#[derive(Debug, Default)]
pub struct InputMap {
    pub data: AHashMap<String, Json>,
}

impl InputMap {
    /// Flatten `input` under the root name `key` (usually "input").
    pub fn new(key: &str, input: &Input) -> Self {
        let mut map = InputMap::default();
        map.build(key, input);
        map
    }

    fn build(&mut self, key: &str, input: &Input) {
        for (child, value) in input {
            let child_key = format!("{key}.{child}");
            if let Json::Object(nested) = value {
                self.build(&child_key, nested);
            }
            self.data.insert(child_key, value.clone());
        }
    }
}

/// The completion graph: the vertices visited during an execution, with
/// edges only between complete steps. A read-only diagnostic by-product.
#[derive(Debug, Default)]
pub struct CompletionGraph {
    vertices: Vec<String>,
    edges: Vec<(String, String)>,
}

impl CompletionGraph {
    fn add_vertex(&mut self, hash: String) {
        self.vertices.push(hash);
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        self.edges.push((from.to_string(), to.to_string()));
    }

    pub fn vertices(&self) -> &[String] {
        &self.vertices
    }

    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.edges.iter().any(|(a, b)| a == from && b == to)
    }
}

/// Result of a workflow execution.
#[derive(Debug, Default)]
pub struct ExecutionResult {
    /// Completion state per step hash.
    pub state: AHashMap<String, State>,
    /// Edges between complete steps; diagnostic only.
    pub completion: CompletionGraph,
    /// The highest-priority complete outcome node, when one exists.
    /// `None` means the workflow is still in progress or unreachable.
    pub outcome: Option<String>,
}

impl Graph {
    /// Execute the graph from `start` against a workflow input.
    ///
    /// Traversal is breadth-first from the start vertex; each reachable
    /// vertex is visited exactly once and its state derives from the
    /// completion of its predecessors.
    ///
    /// Known limitation: consecutive actions sharing a completion predicate
    /// all complete on the same input. An approval is not consumed by the
    /// first action that matches it.
    pub fn execute(&self, start: &str, input: &Input) -> Result<ExecutionResult, Error> {
        let input_map = InputMap::new("input", input);

        let start_idx = self
            .node_index(start)
            .ok_or_else(|| ExecuteError::StartNotFound(start.to_string()))?;
        match &self.step(start_idx).body {
            Body::Ref(node) if node.kind == NodeKind::Start => {}
            _ => return Err(ExecuteError::BadStart(start.to_string()).into()),
        }

        tracing::debug!(%start, "executing workflow graph");

        let mut state: AHashMap<String, State> = AHashMap::new();
        let mut completion = CompletionGraph::default();
        // the zero node loses to any completed outcome
        let mut outcome = Node::default();

        let mut queue = VecDeque::new();
        let mut discovered = AHashSet::new();
        queue.push_back(start_idx);
        discovered.insert(start_idx);

        while let Some(idx) = queue.pop_front() {
            let step = self.step(idx);
            let key = step.hash();

            let mut current = State::Inactive;
            if idx == start_idx {
                current = State::Complete;
            }

            completion.add_vertex(key.clone());

            // count complete predecessors, extending the completion graph
            // with an edge for each one
            let mut predecessors = 0usize;
            let mut completed = 0usize;
            for pred in self.predecessors(idx) {
                predecessors += 1;
                let pred_key = self.step(pred).hash();
                if state.get(&pred_key) == Some(&State::Complete) {
                    completed += 1;
                    completion.add_edge(&pred_key, &key);
                }
            }

            match &step.body {
                Body::Check { .. } => {
                    // a check with no completed predecessor cannot run
                    if completed > 0 {
                        let expr = self
                            .expression(&key)
                            .ok_or_else(|| ExecuteError::MissingExpression(key.clone()))?;
                        let value = expr.eval(&input_map.data).map_err(|e| ExecuteError::Eval {
                            hash: key.clone(),
                            source: e,
                        })?;
                        match value {
                            Value::Bool(true) => current = State::Complete,
                            Value::Bool(false) => {}
                            found => {
                                return Err(ExecuteError::NonBooleanResult {
                                    hash: key.clone(),
                                    found,
                                }
                                .into());
                            }
                        }
                    }
                }
                Body::Boolean(BoolOp::And) => {
                    if predecessors > 0 && completed == predecessors {
                        current = State::Complete;
                    }
                }
                Body::Boolean(BoolOp::Or) => {
                    if completed > 0 {
                        current = State::Complete;
                    }
                }
                Body::Action { name, payload } => {
                    if completed > 0 {
                        current = State::Active;
                        if let Some(payload) = payload {
                            let done =
                                payload
                                    .complete(input)
                                    .map_err(|e| ExecuteError::Action {
                                        name: name.clone(),
                                        source: e,
                                    })?;
                            if done == Some(true) {
                                current = State::Complete;
                            }
                        }
                    }
                }
                Body::Ref(node) => {
                    if completed > 0 {
                        current = State::Complete;
                    }
                    if current == State::Complete
                        && node.kind == NodeKind::Outcome
                        && outcome.priority < node.priority
                    {
                        outcome = node.clone();
                    }
                }
            }

            state.insert(key, current);

            for succ in self.successors(idx) {
                if discovered.insert(succ) {
                    queue.push_back(succ);
                }
            }
        }

        let outcome = (!outcome.id.is_empty()).then_some(outcome.id);
        Ok(ExecutionResult {
            state,
            completion,
            outcome,
        })
    }
}
