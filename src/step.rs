use crate::dialect::ActionValue;
use crate::node::{Node, NodeKind};
use crate::program::DocPath;
use std::fmt;

/// Boolean operations combining child steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolOp::And => write!(f, "AND"),
            BoolOp::Or => write!(f, "OR"),
        }
    }
}

/// The body of a workflow step.
#[derive(Debug)]
pub enum Body {
    /// A reference to a dialect-declared start or outcome node.
    Ref(Node),
    /// A boolean expression evaluated against the workflow input.
    Check { expression: String },
    /// An AND/OR aggregation over the step's children.
    Boolean(BoolOp),
    /// A dialect-provided side effect with an optional typed payload.
    Action {
        name: String,
        payload: Option<Box<dyn ActionValue>>,
    },
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Ref(node) => write!(f, "{}: {}", node.kind, node.id),
            Body::Check { expression } => {
                write!(f, "check: {}", expression.replace('"', "\\\""))
            }
            Body::Boolean(op) => write!(f, "{}", op),
            Body::Action { name, .. } => write!(f, "action: {}", name),
        }
    }
}

/// A single statement in a workflow pass.
#[derive(Debug)]
pub struct Step {
    /// Friendly display name; empty when the step has none.
    pub name: String,
    pub body: Body,
    /// Child steps; only Boolean steps have children.
    pub children: Vec<Step>,
    /// Name of the pass this step belongs to.
    pub pass: String,
    /// Path of child indices from the root of the pass, e.g. `[1, 0]` for
    /// the first child of the second root step. Assigned during compilation.
    pub position: Vec<usize>,
    /// Where the step sits in the parsed document, when it came from one.
    /// Used to annotate errors.
    pub location: Option<DocPath>,
}

impl Step {
    fn from_body(body: Body) -> Self {
        Step {
            name: String::new(),
            body,
            children: Vec::new(),
            pass: String::new(),
            position: Vec::new(),
            location: None,
        }
    }

    /// A reference to a start node with the given id.
    pub fn start(id: &str) -> Self {
        Step::from_body(Body::Ref(Node::new(id, NodeKind::Start)))
    }

    /// A reference to an outcome node with the given id.
    pub fn outcome(id: &str) -> Self {
        Step::from_body(Body::Ref(Node::new(id, NodeKind::Outcome)))
    }

    /// A reference to an arbitrary node value.
    pub fn reference(node: Node) -> Self {
        Step::from_body(Body::Ref(node))
    }

    /// A check holding a boolean expression.
    pub fn check(expression: &str) -> Self {
        Step::from_body(Body::Check {
            expression: expression.to_string(),
        })
    }

    /// An AND/OR grouping over child steps.
    pub fn boolean(op: BoolOp, children: Vec<Step>) -> Self {
        let mut step = Step::from_body(Body::Boolean(op));
        step.children = children;
        step
    }

    /// An action step, optionally carrying a payload.
    pub fn action(name: &str, payload: Option<Box<dyn ActionValue>>) -> Self {
        Step::from_body(Body::Action {
            name: name.to_string(),
            payload,
        })
    }

    /// Set the display name.
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the priority of a referenced node. Has no effect on other bodies.
    pub fn priority(mut self, priority: i32) -> Self {
        if let Body::Ref(node) = &mut self.body {
            node.priority = priority;
        }
        self
    }

    /// The graph key for this step.
    ///
    /// Ref steps hash to the node id alone, regardless of pass and
    /// position, which unifies them across passes. Every other step
    /// hashes to `pass.position`, keeping it unique to its place in
    /// its own pass.
    pub fn hash(&self) -> String {
        if let Body::Ref(node) = &self.body {
            return node.id.clone();
        }
        let mut key = self.pass.clone();
        for index in &self.position {
            key.push('.');
            key.push_str(&index.to_string());
        }
        key
    }

    /// Human-friendly label for graph representations.
    pub fn label(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        self.body.to_string()
    }

    /// Identity string used in adjacency listings: `[hash] body`.
    pub fn debug_label(&self) -> String {
        format!("[{}] {}", self.hash(), self.body)
    }
}
