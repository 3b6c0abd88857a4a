use std::fmt;

/// Classification of a dialect-declared workflow node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Unknown nodes can only be built programmatically and always fail
    /// compilation. Useful for exercising the compiler's validation.
    #[default]
    Unknown,
    Start,
    Outcome,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Unknown => write!(f, "unknown"),
            NodeKind::Start => write!(f, "start"),
            NodeKind::Outcome => write!(f, "outcome"),
        }
    }
}

/// A dialect-declared endpoint of a workflow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Unique string identifier, e.g. "request".
    pub id: String,
    pub kind: NodeKind,
    /// Friendly display name, e.g. "Request".
    pub name: String,
    /// Priority of the node. When several outcome nodes complete in the
    /// same execution, the one with the highest priority becomes the
    /// overall workflow outcome. Each outcome node must have a unique
    /// priority greater than zero.
    pub priority: i32,
}

impl Node {
    pub fn new(id: &str, kind: NodeKind) -> Self {
        Node {
            id: id.to_string(),
            kind,
            ..Default::default()
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
