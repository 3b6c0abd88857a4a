//! Glide programs: named passes of workflow steps.

mod parse;

pub use parse::annotate;

use crate::dialect::Dialect;
use crate::error::Error;
use crate::step::Step;
use indexmap::IndexMap;
use std::fmt;

/// A location in a parsed workflow document, as a path of mapping keys and
/// sequence indices from the root. Renders as
/// `$.workflow.default.steps[0].check`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocPath(Vec<Segment>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl DocPath {
    pub fn root() -> Self {
        DocPath(Vec::new())
    }

    /// Extend with a mapping key.
    pub fn key(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(name.to_string()));
        DocPath(segments)
    }

    /// Extend with a sequence index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        DocPath(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.0 {
            match segment {
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// A named sequence of steps running from a start node to an outcome node.
#[derive(Debug, Default)]
pub struct Path {
    pub id: String,
    pub steps: Vec<Step>,
}

/// A Glide workflow definition: passes keyed by name.
///
/// All passes of a program compile into the *same* graph; passes sharing
/// start or outcome ids converge at those nodes.
#[derive(Debug, Default)]
pub struct Program {
    pub workflow: IndexMap<String, Path>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    /// A program with a single `default` pass.
    pub fn simple(steps: Vec<Step>) -> Self {
        Program::new().pass("default", steps)
    }

    /// Add a pass, stamping every step (and nested child) with its name.
    pub fn pass(mut self, name: &str, mut steps: Vec<Step>) -> Self {
        for step in &mut steps {
            set_pass(step, name);
        }
        self.workflow.insert(
            name.to_string(),
            Path {
                id: name.to_string(),
                steps,
            },
        );
        self
    }

    /// Parse a workflow YAML document using the given dialect.
    pub fn parse(source: &str, dialect: &Dialect) -> Result<Program, Error> {
        parse::parse_program(source, dialect)
    }
}

fn set_pass(step: &mut Step, pass: &str) {
    step.pass = pass.to_string();
    for child in &mut step.children {
        set_pass(child, pass);
    }
}
