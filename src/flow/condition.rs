use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

tag_enum! {
    /// Comparison applied by a single equation.
    ComparisonOperator, "comparison operator", {
        Equal => "==",
        NotEqual => "!=",
        GreaterThan => ">",
        GreaterThanOrEqual => ">=",
        SmallerThan => "<",
        SmallerThanOrEqual => "<=",
        Contains => "contains",
        NotContains => "not_contains",
        Exists => "exists",
        NotExist => "not_exist",
    }
}

impl ComparisonOperator {
    /// Unary operators only inspect the left-hand side.
    pub fn is_unary(&self) -> bool {
        matches!(self, ComparisonOperator::Exists | ComparisonOperator::NotExist)
    }
}

tag_enum! {
    /// How the equations of a condition are combined.
    LogicalOperator, "logical operator", {
        And => "&&",
        Or => "||",
    }
}

/// A single `left <operator> right` comparison over dynamic variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equation {
    pub left: String,
    pub operator: ComparisonOperator,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub right: String,
}

impl Equation {
    pub fn new(
        left: impl Into<String>,
        operator: ComparisonOperator,
        right: impl Into<String>,
    ) -> Self {
        Self {
            left: left.into(),
            operator,
            right: right.into(),
        }
    }
}

/// When an edge fires.
///
/// Prompt conditions are natural-language descriptions judged by the platform;
/// equation conditions compare dynamic variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionCondition {
    Prompt {
        prompt: String,
    },
    Equation {
        equations: Vec<Equation>,
        operator: LogicalOperator,
    },
}

impl TransitionCondition {
    pub fn prompt(description: impl Into<String>) -> Self {
        TransitionCondition::Prompt {
            prompt: description.into(),
        }
    }

    pub fn all_of(equations: Vec<Equation>) -> Self {
        TransitionCondition::Equation {
            equations,
            operator: LogicalOperator::And,
        }
    }

    pub fn any_of(equations: Vec<Equation>) -> Self {
        TransitionCondition::Equation {
            equations,
            operator: LogicalOperator::Or,
        }
    }

    /// The wire tag of this condition.
    pub fn kind(&self) -> &'static str {
        match self {
            TransitionCondition::Prompt { .. } => "prompt",
            TransitionCondition::Equation { .. } => "equation",
        }
    }

    /// A one-line human-readable description.
    pub fn describe(&self) -> String {
        match self {
            TransitionCondition::Prompt { prompt } => prompt.clone(),
            TransitionCondition::Equation {
                equations,
                operator,
            } => equations
                .iter()
                .map(|eq| {
                    if eq.operator.is_unary() {
                        format!("{} {}", eq.left, eq.operator)
                    } else {
                        format!("{} {} {}", eq.left, eq.operator, eq.right)
                    }
                })
                .collect::<Vec<_>>()
                .join(&format!(" {} ", operator)),
        }
    }

    pub(crate) fn check(&self, edge_id: &str) -> Result<(), ValidationError> {
        let invalid = |message: &str| ValidationError::InvalidCondition {
            edge_id: edge_id.to_string(),
            message: message.to_string(),
        };
        match self {
            TransitionCondition::Prompt { prompt } => {
                if prompt.trim().is_empty() {
                    return Err(invalid("prompt description is empty"));
                }
            }
            TransitionCondition::Equation { equations, .. } => {
                if equations.is_empty() {
                    return Err(invalid("equation condition has no equations"));
                }
                for eq in equations {
                    if eq.left.trim().is_empty() {
                        return Err(invalid("equation has an empty left-hand side"));
                    }
                    if !eq.operator.is_unary() && eq.right.trim().is_empty() {
                        return Err(invalid(&format!(
                            "operator '{}' needs a right-hand side",
                            eq.operator
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
