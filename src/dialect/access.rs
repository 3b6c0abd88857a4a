//! The access dialect: access-request approval workflows.
//!
//! Workflows written in this dialect run from a `request` start to an
//! `approved` outcome, gated by an `approval` action that completes when
//! someone from a required group has approved.

use super::{ActionMap, ActionValue, Dialect};
use crate::error::ActionError;
use ahash::AHashMap;
use serde::Deserialize;

/// Build the access dialect.
pub fn dialect() -> Dialect {
    Dialect::new()
        .start("request", "Request")
        .outcome("approved", "Approved", 1)
        .with_actions(actions)
}

fn actions() -> ActionMap {
    let mut actions: ActionMap = AHashMap::new();
    actions.insert("approval".to_string(), Box::<Approval>::default());
    actions
}

/// Payload of the `approval` action: the groups allowed to approve.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Approval {
    #[serde(default)]
    pub groups: Vec<String>,
}

/// The shape of the workflow input consulted by [`Approval::complete`].
#[derive(Debug, Default, Deserialize)]
struct ApprovalInput {
    #[serde(default)]
    approvals: Vec<ApprovalRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct ApprovalRecord {
    #[serde(default)]
    groups: Vec<String>,
}

impl ActionValue for Approval {
    fn decode(&mut self, with: &serde_yaml::Value) -> Result<(), ActionError> {
        *self = serde_yaml::from_value(with.clone())?;
        Ok(())
    }

    fn complete(
        &self,
        input: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Option<bool>, ActionError> {
        let input: ApprovalInput =
            serde_json::from_value(serde_json::Value::Object(input.clone()))?;
        for approval in &input.approvals {
            for group in &approval.groups {
                if self.groups.contains(group) {
                    // someone from a required group has approved
                    return Ok(Some(true));
                }
            }
        }
        Ok(Some(false))
    }

    fn describe(&self) -> String {
        format!("notifying {} for access approval", self.groups.join(", "))
    }
}
