//! Shared fixtures for glide integration tests.

use glide::error::ActionError;
use glide::prelude::*;

/// Dialect used across tests: `request` and `approved` nodes plus a
/// `my_action` action.
#[allow(dead_code)]
pub fn test_dialect() -> Dialect {
    Dialect::new()
        .start("request", "")
        .outcome("approved", "", 1)
        .with_actions(test_actions)
}

#[allow(dead_code)]
pub fn test_actions() -> ActionMap {
    let mut actions = ActionMap::new();
    actions.insert(
        "my_action".to_string(),
        Box::<TestAction>::default() as Box<dyn ActionValue>,
    );
    actions
}

/// Action payload whose completion outcome is fixed up front.
#[derive(Debug, Default, Clone)]
pub struct TestAction {
    pub complete: bool,
}

#[allow(dead_code)]
impl TestAction {
    pub fn completing() -> Option<Box<dyn ActionValue>> {
        Some(Box::new(TestAction { complete: true }))
    }

    pub fn pending() -> Option<Box<dyn ActionValue>> {
        Some(Box::new(TestAction { complete: false }))
    }
}

impl ActionValue for TestAction {
    fn decode(&mut self, _with: &serde_yaml::Value) -> Result<(), ActionError> {
        Ok(())
    }

    fn complete(
        &self,
        _input: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Option<bool>, ActionError> {
        Ok(Some(self.complete))
    }
}

/// Sorted `"[from] body -> [to] body"` adjacency listing, mirroring how the
/// graph connects its vertices.
#[allow(dead_code)]
pub fn adjacency(graph: &Graph) -> Vec<String> {
    let mut edges: Vec<String> = graph
        .edges()
        .map(|(from, to)| format!("{} -> {}", from.debug_label(), to.debug_label()))
        .collect();
    edges.sort();
    edges
}

/// The empty workflow input.
#[allow(dead_code)]
pub fn no_input() -> Input {
    Input::new()
}

/// Parse a JSON object literal into a workflow input.
#[allow(dead_code)]
pub fn input_from(json: serde_json::Value) -> Input {
    json.as_object().expect("test input must be an object").clone()
}
