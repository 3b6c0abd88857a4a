//! Compiles programs into execution graphs.

use crate::error::{CompileError, Error, NodeError};
use crate::expr::{Env, Type};
use crate::graph::Graph;
use crate::node::NodeKind;
use crate::program::Program;
use crate::schema::{Schema, SchemaProvider};
use crate::step::{Body, Step};
use std::mem;

/// Default maximum depth that steps can be nested in workflows.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Compiles a [`Program`] into an execution [`Graph`], type-checking check
/// expressions against the input schema along the way.
pub struct Compiler {
    program: Program,
    schema: Schema,
    max_depth: usize,
}

impl Compiler {
    pub fn new(program: Program) -> Self {
        Compiler {
            program,
            schema: Schema::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Type-check expressions against the given input schema.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Bound the nesting depth of steps. Prevents deeply nested documents
    /// from exhausting the compiler.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Compile the program into an execution graph.
    pub fn compile(self) -> Result<Graph, Error> {
        let provider = SchemaProvider::new("input", &self.schema);
        let env = Env::new(&provider).variable("input", Type::Object("input".to_string()));

        let mut graph = Graph::new();
        for (pass_id, path) in self.program.workflow {
            tracing::debug!(pass = %pass_id, steps = path.steps.len(), "compiling workflow pass");
            compile_pass(&mut graph, &env, path.steps, self.max_depth)?;
        }
        Ok(graph)
    }
}

fn compile_pass(
    graph: &mut Graph,
    env: &Env<'_>,
    steps: Vec<Step>,
    max_depth: usize,
) -> Result<(), Error> {
    if steps.len() < 2 {
        return Err(CompileError::TooFewSteps(steps.len()).into());
    }
    expect_ref(&steps[0], NodeKind::Start)?;
    expect_ref(&steps[steps.len() - 1], NodeKind::Outcome)?;

    let mut visitor = Visitor {
        graph,
        env,
        max_depth,
        num_steps: steps.len(),
    };

    let mut previous: Option<String> = None;
    for (index, step) in steps.into_iter().enumerate() {
        let location = step.location.clone();
        let key = visitor
            .visit(step, index, 0, None, previous.as_deref(), &[])
            .map_err(|e| NodeError::wrap(e, location))?;
        previous = Some(key);
    }
    Ok(())
}

fn expect_ref(step: &Step, kind: NodeKind) -> Result<(), CompileError> {
    match &step.body {
        Body::Ref(node) if node.kind == kind => Ok(()),
        _ => Err(match kind {
            NodeKind::Start => CompileError::FirstStepNotStart,
            _ => CompileError::LastStepNotOutcome,
        }),
    }
}

struct Visitor<'a, 'e, 'p> {
    graph: &'a mut Graph,
    env: &'e Env<'p>,
    max_depth: usize,
    /// Number of root steps in the pass being visited; outcome refs must
    /// sit at the final index.
    num_steps: usize,
}

impl Visitor<'_, '_, '_> {
    /// Visit one step: validate it, insert its vertex and edges, then
    /// recurse into its children.
    ///
    /// `previous` is the preceding *root* step, inherited unchanged by
    /// child visits: a boolean receives its inbound edges from its children
    /// and its children receive theirs from the boolean's own predecessor.
    fn visit(
        &mut self,
        mut step: Step,
        index: usize,
        depth: usize,
        parent: Option<&str>,
        previous: Option<&str>,
        parent_position: &[usize],
    ) -> Result<String, Error> {
        if depth > self.max_depth {
            return Err(CompileError::MaxDepthExceeded {
                max: self.max_depth,
                depth,
            }
            .into());
        }

        step.position = parent_position.to_vec();
        step.position.push(index);
        let position = step.position.clone();
        let children = mem::take(&mut step.children);

        let compiled = match &step.body {
            Body::Check { expression } => {
                let compiled = self.env.compile(expression).map_err(CompileError::Expr)?;
                if *compiled.output_type() != Type::Bool {
                    return Err(
                        CompileError::NonBooleanCheck(compiled.output_type().clone()).into(),
                    );
                }
                Some(compiled)
            }
            Body::Ref(node) => {
                match node.kind {
                    NodeKind::Unknown => {
                        return Err(CompileError::UnknownRef {
                            id: node.id.clone(),
                        }
                        .into());
                    }
                    NodeKind::Start => {
                        if index != 0 || depth != 0 {
                            return Err(CompileError::MisplacedStart {
                                id: node.id.clone(),
                                index,
                                depth,
                            }
                            .into());
                        }
                    }
                    NodeKind::Outcome => {
                        if index != self.num_steps - 1 || depth != 0 {
                            return Err(CompileError::MisplacedOutcome {
                                id: node.id.clone(),
                                index,
                                depth,
                            }
                            .into());
                        }
                    }
                }
                None
            }
            _ => None,
        };

        let key = self.graph.add_step(step);
        if let Some(compiled) = compiled {
            self.graph.store_expression(key.clone(), compiled);
        }

        // a child points into its aggregating boolean
        if let Some(parent) = parent {
            self.graph.add_edge(&key, parent)?;
        }
        // leaves connect from the preceding step; a boolean instead takes
        // its inbound edges from its children, added in the recursion below
        if children.is_empty() {
            if let Some(previous) = previous {
                self.graph.add_edge(previous, &key)?;
            }
        }

        for (child_index, child) in children.into_iter().enumerate() {
            let location = child.location.clone();
            self.visit(child, child_index, depth + 1, Some(&key), previous, &position)
                .map_err(|e| NodeError::wrap(e, location))?;
        }

        Ok(key)
    }
}
