//! Prelude module for convenient imports.
//!
//! Re-exports the most commonly used types from the glide crate.

// Compilation and execution
pub use crate::compiler::{Compiler, DEFAULT_MAX_DEPTH};
pub use crate::executor::{CompletionGraph, ExecutionResult, Input, InputMap, State};
pub use crate::graph::Graph;

// Language building blocks
pub use crate::dialect::{ActionMap, ActionValue, Dialect};
pub use crate::node::{Node, NodeKind};
pub use crate::program::{DocPath, Path, Program};
pub use crate::step::{Body, BoolOp, Step};

// Input typing
pub use crate::schema::{Schema, SchemaKind, SchemaProvider};

// Error types
pub use crate::error::{ActionError, Error, NodeError};
