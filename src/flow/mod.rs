//! The conversation-flow data model.
//!
//! Every entity here is validated when it is constructed, so malformed nodes,
//! edges, or tools never reach the builder. A [`Flow`] is only ever produced by
//! [`FlowBuilder::build`](crate::builder::FlowBuilder::build) and exposes no
//! mutable access to its collections.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines a closed set of wire tags: the enum, its serde names, `as_str`,
/// `Display`, and a `FromStr` that rejects unknown tags with a `ValidationError`.
macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, { $( $(#[$vmeta:meta])* $variant:ident => $tag:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $tag)] $variant, )+
        }

        impl $name {
            /// Every tag in the set, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// The wire tag for this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $tag, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $tag => Ok($name::$variant), )+
                    other => Err($crate::error::ValidationError::UnknownTag {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

mod condition;
mod edge;
mod node;
mod ordered;
mod schema;
mod tool;

pub use condition::*;
pub use edge::*;
pub use node::*;
pub use ordered::OrderedMap;
pub use schema::*;
pub use tool::*;

/// Local, construction-time validity rules of an entity.
///
/// Constructors call this before handing out a value. The document parse path
/// calls it again, since deserialized entities bypass the constructors.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Returns an `EmptyField` error when `value` is blank.
pub(crate) fn require_non_empty(
    value: &str,
    entity: &'static str,
    id: &str,
    field: &'static str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField {
            entity,
            id: id.to_string(),
            field,
        })
    } else {
        Ok(())
    }
}

tag_enum! {
    /// The language model strategy requested from the platform.
    ModelChoiceType, "model choice type", {
        Cascading => "cascading",
    }
}

/// Which model the platform should drive the flow with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelChoice {
    #[serde(rename = "type")]
    pub kind: ModelChoiceType,
    pub model: String,
}

impl ModelChoice {
    pub fn cascading(model: impl Into<String>) -> Self {
        Self {
            kind: ModelChoiceType::Cascading,
            model: model.into(),
        }
    }
}

/// A complete, validated conversation flow.
///
/// Produced by `FlowBuilder::build`. Every edge destination resolves, exactly one
/// node is the start node, and every tool reference and parameter schema is
/// consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    pub(crate) conversation_flow_id: Option<String>,
    pub(crate) version: u32,
    pub(crate) is_published: bool,
    pub(crate) global_prompt: String,
    pub(crate) language: String,
    pub(crate) voice_id: String,
    pub(crate) start_index: usize,
    pub(crate) start_speaker: Speaker,
    pub(crate) model_choice: Option<ModelChoice>,
    pub(crate) knowledge_base_ids: Vec<String>,
    pub(crate) begin_tag_display_position: Option<DisplayPosition>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) tools: Vec<Tool>,
}

impl Flow {
    /// Platform identifier of the flow, when it has been assigned one.
    pub fn conversation_flow_id(&self) -> Option<&str> {
        self.conversation_flow_id.as_deref()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_published(&self) -> bool {
        self.is_published
    }

    pub fn global_prompt(&self) -> &str {
        &self.global_prompt
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    pub fn start_node_id(&self) -> &str {
        self.start_node().id()
    }

    pub fn start_speaker(&self) -> Speaker {
        self.start_speaker
    }

    pub fn model_choice(&self) -> Option<&ModelChoice> {
        self.model_choice.as_ref()
    }

    pub fn knowledge_base_ids(&self) -> &[String] {
        &self.knowledge_base_ids
    }

    pub fn begin_tag_display_position(&self) -> Option<DisplayPosition> {
        self.begin_tag_display_position
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Tools in declaration order.
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// The unique start node.
    pub fn start_node(&self) -> &Node {
        &self.nodes[self.start_index]
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Looks a tool up by identifier first, then by name.
    pub fn tool(&self, reference: &str) -> Option<&Tool> {
        self.tools
            .iter()
            .find(|t| t.id() == reference)
            .or_else(|| self.tools.iter().find(|t| t.name() == reference))
    }

    /// Nodes without any outgoing edge.
    pub fn terminal_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_terminal())
    }

    pub fn summary(&self) -> FlowSummary {
        FlowSummary {
            nodes: self.nodes.len(),
            edges: self.nodes.iter().map(|n| n.outgoing().count()).sum(),
            tools: self.tools.len(),
            terminal_nodes: self.terminal_nodes().count(),
        }
    }
}

/// Entity counts of a built flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSummary {
    pub nodes: usize,
    pub edges: usize,
    pub tools: usize,
    pub terminal_nodes: usize,
}

impl fmt::Display for FlowSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} edges, {} tools ({} terminal)",
            self.nodes, self.edges, self.tools, self.terminal_nodes
        )
    }
}
