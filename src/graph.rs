//! The compiled execution graph.

use crate::error::CompileError;
use crate::expr::CompiledExpr;
use crate::step::Step;
use ahash::AHashMap;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

/// A directed acyclic graph of workflow steps keyed by step hash, plus the
/// compiled expression for every check step.
///
/// Produced by one [`crate::compiler::Compiler::compile`] call and immutable
/// afterwards; executions share it read-only.
#[derive(Debug)]
pub struct Graph {
    dag: DiGraph<Step, ()>,
    index: AHashMap<String, NodeIndex>,
    programs: AHashMap<String, CompiledExpr>,
}

impl Graph {
    pub(crate) fn new() -> Self {
        Graph {
            dag: DiGraph::new(),
            index: AHashMap::new(),
            programs: AHashMap::new(),
        }
    }

    /// Insert a vertex, returning its hash. An existing vertex under the
    /// same hash is reused; this is how ref steps unify across passes.
    pub(crate) fn add_step(&mut self, step: Step) -> String {
        let key = step.hash();
        if !self.index.contains_key(&key) {
            let idx = self.dag.add_node(step);
            self.index.insert(key.clone(), idx);
        }
        key
    }

    /// Insert a directed edge between two vertices by hash. Duplicate edges
    /// are no-ops; an edge that would close a cycle is rejected.
    pub(crate) fn add_edge(&mut self, from: &str, to: &str) -> Result<(), CompileError> {
        let a = *self
            .index
            .get(from)
            .ok_or_else(|| CompileError::MissingVertex(from.to_string()))?;
        let b = *self
            .index
            .get(to)
            .ok_or_else(|| CompileError::MissingVertex(to.to_string()))?;
        if self.dag.find_edge(a, b).is_some() {
            return Ok(());
        }
        if a == b || has_path_connecting(&self.dag, b, a, None) {
            return Err(CompileError::Cycle {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.dag.add_edge(a, b, ());
        Ok(())
    }

    pub(crate) fn store_expression(&mut self, key: String, expr: CompiledExpr) {
        self.programs.insert(key, expr);
    }

    pub(crate) fn expression(&self, key: &str) -> Option<&CompiledExpr> {
        self.programs.get(key)
    }

    pub(crate) fn node_index(&self, hash: &str) -> Option<NodeIndex> {
        self.index.get(hash).copied()
    }

    pub(crate) fn step(&self, idx: NodeIndex) -> &Step {
        &self.dag[idx]
    }

    pub(crate) fn predecessors(
        &self,
        idx: NodeIndex,
    ) -> impl Iterator<Item = NodeIndex> + '_ {
        self.dag.neighbors_directed(idx, Direction::Incoming)
    }

    pub(crate) fn successors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.dag.neighbors_directed(idx, Direction::Outgoing)
    }

    /// Look up a vertex by step hash.
    pub fn vertex(&self, hash: &str) -> Option<&Step> {
        self.index.get(hash).map(|idx| &self.dag[*idx])
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.index.contains_key(hash)
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.dag.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.dag.node_count() == 0
    }

    /// All vertices.
    pub fn vertices(&self) -> impl Iterator<Item = &Step> {
        self.dag.node_weights()
    }

    /// All edges as `(from, to)` step pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&Step, &Step)> {
        self.dag.edge_indices().filter_map(|edge| {
            let (a, b) = self.dag.edge_endpoints(edge)?;
            Some((&self.dag[a], &self.dag[b]))
        })
    }

    /// Whether a compiled expression is stored for a vertex hash.
    pub fn has_expression(&self, hash: &str) -> bool {
        self.programs.contains_key(hash)
    }
}
