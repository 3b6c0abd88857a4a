//! Dialect definitions.
//!
//! A dialect configures the workflow language with the allowed start and
//! outcome nodes and the allowed action types. The core never sees the
//! dialect after parsing: resolved nodes are imprinted on the AST, and
//! action payloads travel inside their steps.

pub mod access;

use crate::error::{ActionError, DialectError, ParseError};
use crate::node::{Node, NodeKind};
use ahash::AHashMap;
use std::fmt;

/// A value carried by an action step.
///
/// Payloads absorb the `with:` subtree of their step at parse time, and may
/// additionally provide a completion predicate consulted during execution
/// and a description for diagnostics.
pub trait ActionValue: fmt::Debug {
    /// Decode the `with:` subtree of an action step onto this payload.
    fn decode(&mut self, with: &serde_yaml::Value) -> Result<(), ActionError>;

    /// Completion predicate over the raw workflow input. Payloads without
    /// one return `Ok(None)`, leaving the action Active once reached.
    fn complete(
        &self,
        _input: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Option<bool>, ActionError> {
        Ok(None)
    }

    /// Human-readable description of what the action will do.
    fn describe(&self) -> String {
        String::new()
    }
}

/// Fresh action payloads, keyed by action name.
pub type ActionMap = AHashMap<String, Box<dyn ActionValue>>;

/// The configuration bundle for a workflow language variant.
pub struct Dialect {
    /// Predefined nodes which may open and close a workflow pass.
    pub nodes: AHashMap<String, Node>,
    /// Factory producing fresh action payloads. Invoked once per parse so
    /// payload state is isolated between parses.
    pub actions: Option<fn() -> ActionMap>,
}

impl Dialect {
    pub fn new() -> Self {
        Dialect {
            nodes: AHashMap::new(),
            actions: None,
        }
    }

    /// Declare a start node.
    pub fn start(mut self, id: &str, name: &str) -> Self {
        self.nodes
            .insert(id.to_string(), Node::new(id, NodeKind::Start).named(name));
        self
    }

    /// Declare an outcome node. Priorities must be unique and greater
    /// than zero.
    pub fn outcome(mut self, id: &str, name: &str, priority: i32) -> Self {
        self.nodes.insert(
            id.to_string(),
            Node::new(id, NodeKind::Outcome).named(name).priority(priority),
        );
        self
    }

    /// Declare the action factory.
    pub fn with_actions(mut self, factory: fn() -> ActionMap) -> Self {
        self.actions = Some(factory);
        self
    }

    /// Check the dialect invariants: every outcome node has a positive
    /// priority and no two outcomes share one. Idempotent.
    pub fn validate(&self) -> Result<(), DialectError> {
        let mut seen = AHashMap::new();
        for node in self.nodes.values() {
            if node.kind != NodeKind::Outcome {
                continue;
            }
            if node.priority <= 0 {
                return Err(DialectError::NonPositivePriority {
                    id: node.id.clone(),
                    priority: node.priority,
                });
            }
            if seen.insert(node.priority, ()).is_some() {
                return Err(DialectError::DuplicatePriority(node.priority));
            }
        }
        Ok(())
    }

    /// Resolve a node reference of the given kind.
    ///
    /// A declared id yields the declared node with its id overwritten to
    /// `id` and its name preserved; a declared kind disagreeing with the
    /// step form is a kind-mismatch. Undeclared ids resolve to a bare node
    /// of the requested kind.
    pub fn resolve(&self, id: &str, kind: NodeKind) -> Result<Node, ParseError> {
        match self.nodes.get(id) {
            Some(declared) => {
                if declared.kind != kind {
                    return Err(ParseError::KindMismatch {
                        id: id.to_string(),
                        declared: declared.kind,
                        requested: kind,
                    });
                }
                let mut node = declared.clone();
                node.id = id.to_string();
                Ok(node)
            }
            None => Ok(Node::new(id, kind)),
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::new()
    }
}
