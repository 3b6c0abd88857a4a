use crate::expr::{Type, Value};
use crate::node::NodeKind;
use crate::program::DocPath;
use thiserror::Error;

/// Errors raised while validating a dialect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialectError {
    #[error("all outcome nodes must have a priority greater than 0: node '{id}' has priority {priority}")]
    NonPositivePriority { id: String, priority: i32 },

    #[error("each outcome node must have a unique priority: found two nodes with priority {0}")]
    DuplicatePriority(i32),
}

/// Errors raised while parsing a workflow document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("document must contain a 'workflow' mapping")]
    MissingWorkflow,

    #[error("path '{0}' must contain a 'steps' sequence")]
    MissingSteps(String),

    #[error("a step must be a mapping")]
    StepNotAMapping,

    #[error("a step cannot have both 'and' and 'or' together")]
    AndOrConflict,

    #[error("a step must contain one of 'start', 'outcome', 'check', 'action', 'and' or 'or'")]
    UnknownStepShape,

    #[error("'{key}' must hold a {expected}")]
    BadFieldValue {
        key: String,
        expected: &'static str,
    },

    #[error("node '{id}' is declared as {declared} and cannot be used in a {requested} step")]
    KindMismatch {
        id: String,
        declared: NodeKind,
        requested: NodeKind,
    },

    #[error("no actions are defined for this dialect")]
    NoActions,

    #[error("unknown action type '{0}'")]
    UnknownAction(String),

    #[error("decoding action '{name}': {source}")]
    ActionDecode {
        name: String,
        #[source]
        source: ActionError,
    },
}

/// A failure reported by an action payload hook.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ActionError(pub String);

impl From<serde_yaml::Error> for ActionError {
    fn from(err: serde_yaml::Error) -> Self {
        ActionError(err.to_string())
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        ActionError(err.to_string())
    }
}

/// Errors raised while compiling a program into an execution graph.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("workflow must contain at least 2 steps: got {0}")]
    TooFewSteps(usize),

    #[error("the first step must be a reference to a start node")]
    FirstStepNotStart,

    #[error("the last step must be a reference to an outcome node")]
    LastStepNotOutcome,

    #[error("invalid node '{id}': did not match any known start or outcome nodes")]
    UnknownRef { id: String },

    #[error("start nodes can only be referenced at the beginning of a workflow: '{id}' had index {index} and depth {depth}")]
    MisplacedStart {
        id: String,
        index: usize,
        depth: usize,
    },

    #[error("outcome nodes can only be referenced at the end of a workflow: '{id}' had index {index} and depth {depth}")]
    MisplacedOutcome {
        id: String,
        index: usize,
        depth: usize,
    },

    #[error("maximum nesting depth of {max} was exceeded (depth={depth})")]
    MaxDepthExceeded { max: usize, depth: usize },

    #[error("check expression failed to compile: {0}")]
    Expr(#[from] ExprError),

    #[error("check expression must return a boolean (returned {0} instead)")]
    NonBooleanCheck(Type),

    #[error("edge from '{from}' to '{to}' would create a cycle")]
    Cycle { from: String, to: String },

    #[error("edge endpoint '{0}' is not a vertex in the graph")]
    MissingVertex(String),
}

/// Errors raised while executing a compiled graph.
#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("start vertex '{0}' does not exist in the graph")]
    StartNotFound(String),

    #[error("provided start '{0}' was not a start node reference")]
    BadStart(String),

    #[error("no compiled expression found for '{0}'")]
    MissingExpression(String),

    #[error("check '{hash}' returned {found}, expected a boolean")]
    NonBooleanResult { hash: String, found: Value },

    #[error("evaluating check '{hash}': {source}")]
    Eval {
        hash: String,
        #[source]
        source: EvalError,
    },

    #[error("action '{name}' completion failed: {source}")]
    Action {
        name: String,
        #[source]
        source: ActionError,
    },
}

/// Errors from compiling an expression: parsing or type-checking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("undeclared variable '{0}'")]
    UnknownVariable(String),

    #[error("unknown field '{field}' on '{object}'")]
    UnknownField { object: String, field: String },

    #[error("type {0} does not support field selection")]
    NotAnObject(Type),

    #[error("operator '{op}' cannot be applied to {left} and {right}")]
    OperandMismatch {
        op: &'static str,
        left: Type,
        right: Type,
    },

    #[error("operator '{op}' expects {expected}, found {found}")]
    BadOperand {
        op: &'static str,
        expected: Type,
        found: Type,
    },
}

/// Errors from evaluating a compiled expression against input data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("input '{0}' not found in the provided data")]
    InputNotFound(String),

    #[error("type mismatch during '{op}': expected {expected}, but found value '{found}'")]
    TypeMismatch {
        op: &'static str,
        expected: &'static str,
        found: Value,
    },

    #[error("'{0}' cannot be resolved to an input path")]
    Unresolvable(String),

    #[error("values in '{op}' are not comparable")]
    NotComparable { op: &'static str },
}

/// An error annotated with the source location of the step that caused it.
///
/// Wrapping is idempotent: wrapping an error that is already a `NodeError`
/// returns it unchanged, so the innermost location wins.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct NodeError {
    pub location: Option<DocPath>,
    source: Box<Error>,
}

impl NodeError {
    /// Wrap `err` with a source location, unless it already carries one.
    pub fn wrap(err: impl Into<Error>, location: Option<DocPath>) -> Error {
        let err = err.into();
        if matches!(err, Error::Node(_)) {
            return err;
        }
        Error::Node(NodeError {
            location,
            source: Box::new(err),
        })
    }

    /// The wrapped error.
    pub fn inner(&self) -> &Error {
        &self.source
    }

    /// Render the error together with an annotated excerpt of the source
    /// document. Falls back to the bare message when the location cannot
    /// be resolved against `source_text`.
    pub fn pretty_print(&self, source_text: &str) -> String {
        let excerpt = self
            .location
            .as_ref()
            .and_then(|path| crate::program::annotate(source_text, path));
        match excerpt {
            Some(excerpt) => format!("{self}\n{excerpt}"),
            None => self.to_string(),
        }
    }
}

/// Any error produced by the glide pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Dialect(#[from] DialectError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error(transparent)]
    Node(#[from] NodeError),
}
