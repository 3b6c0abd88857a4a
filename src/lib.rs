//! # Glide - Declarative Workflow Language
//!
//! **Glide** is a small declarative workflow language. A YAML document
//! describes a directed workflow over named nodes, connected by boolean
//! checks, dialect-provided actions, and AND/OR groupings. Programs are
//! compiled ahead of time into a directed acyclic execution graph, with
//! every check expression type-checked against a JSON-Schema description
//! of the workflow input, then executed repeatedly against input data.
//!
//! ## Core Workflow
//!
//! 1. **Define a dialect**: the start/outcome nodes a workflow may use and
//!    the actions it may invoke ([`dialect::Dialect`]).
//! 2. **Parse**: turn a workflow document into a [`program::Program`], or
//!    build one programmatically with [`step::Step`] constructors.
//! 3. **Compile**: [`compiler::Compiler`] walks the program, enforces the
//!    ordering and nesting rules, type-checks every `check:` expression,
//!    and produces a [`graph::Graph`].
//! 4. **Execute**: run the graph against a JSON input to get per-step
//!    completion states and an overall outcome
//!    ([`executor::ExecutionResult`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use glide::prelude::*;
//!
//! fn main() -> Result<(), Error> {
//!     let dialect = Dialect::new()
//!         .start("request", "Request")
//!         .outcome("approved", "Approved", 1);
//!
//!     let source = r#"
//! workflow:
//!   default:
//!     steps:
//!       - start: request
//!       - check: input.group == "test"
//!       - outcome: approved
//! "#;
//!
//!     let program = Program::parse(source, &dialect)?;
//!
//!     let schema = Schema::from_json(r#"{"properties": {"group": {"type": "string"}}}"#)
//!         .expect("schema is valid JSON");
//!     let graph = Compiler::new(program).with_schema(schema).compile()?;
//!
//!     let input = serde_json::json!({ "group": "test" });
//!     let result = graph.execute("request", input.as_object().expect("object input"))?;
//!
//!     assert_eq!(result.outcome.as_deref(), Some("approved"));
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! Steps referencing the same start or outcome node unify across passes, so
//! a program with several passes converges at its shared endpoints. Every
//! other step stays unique to its position in its own pass. Compilation and
//! execution are fully synchronous; a compiled graph is immutable and safe
//! to execute any number of times.

pub mod compiler;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod expr;
pub mod graph;
pub mod node;
pub mod prelude;
pub mod program;
pub mod schema;
pub mod step;
