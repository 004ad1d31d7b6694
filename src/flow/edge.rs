use super::{TransitionCondition, Validate, require_non_empty};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A directed, conditioned transition to another node.
///
/// The destination is only checked for existence when the whole flow is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Edge {
    id: String,
    destination_node_id: String,
    transition_condition: TransitionCondition,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        destination_node_id: impl Into<String>,
        transition_condition: TransitionCondition,
    ) -> Result<Self, ValidationError> {
        let edge = Self {
            id: id.into(),
            destination_node_id: destination_node_id.into(),
            transition_condition,
        };
        edge.validate()?;
        Ok(edge)
    }

    /// Shorthand for an edge with a natural-language condition.
    pub fn prompt(
        id: impl Into<String>,
        destination_node_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            id,
            destination_node_id,
            TransitionCondition::prompt(description),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn destination_node_id(&self) -> &str {
        &self.destination_node_id
    }

    pub fn transition_condition(&self) -> &TransitionCondition {
        &self.transition_condition
    }
}

impl Validate for Edge {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.id, "edge", &self.id, "id")?;
        require_non_empty(
            &self.destination_node_id,
            "edge",
            &self.id,
            "destination_node_id",
        )?;
        self.transition_condition.check(&self.id)
    }
}
