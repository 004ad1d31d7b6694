use std::fmt;
use thiserror::Error;

/// Errors raised when a single entity (node, edge, tool, ...) is malformed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{entity} '{id}' has an empty '{field}' field")]
    EmptyField {
        entity: &'static str,
        id: String,
        field: &'static str,
    },

    #[error("Unrecognized {kind} tag '{value}'")]
    UnknownTag { kind: &'static str, value: String },

    #[error("Node '{node_id}' of type '{node_type}' is invalid: {message}")]
    NodeRule {
        node_id: String,
        node_type: String,
        message: String,
    },

    #[error("Tool '{tool_id}' has an invalid URL '{url}': {message}")]
    InvalidUrl {
        tool_id: String,
        url: String,
        message: String,
    },

    #[error("Tool '{tool_id}' must have a timeout greater than zero")]
    ZeroTimeout { tool_id: String },

    #[error("Variable '{name}' is invalid: {message}")]
    InvalidVariable { name: String, message: String },

    #[error("Coordinate {axis} of node '{node_id}' is not a finite number")]
    NonFiniteCoordinate { node_id: String, axis: char },

    #[error("Coordinate {0} of the begin tag is not a finite number")]
    NonFiniteBeginTag(char),

    #[error("Transition condition of edge '{edge_id}' is invalid: {message}")]
    InvalidCondition { edge_id: String, message: String },

    #[error("Flow setting '{0}' must not be empty")]
    EmptySetting(&'static str),
}

/// The collection in which an identifier collided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Node,
    Tool,
    ToolName,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Node => write!(f, "node"),
            CollectionKind::Tool => write!(f, "tool"),
            CollectionKind::ToolName => write!(f, "tool name"),
        }
    }
}

/// Raised when an identifier is already present in the target collection.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Duplicate {kind} identifier '{id}'")]
pub struct DuplicateIdError {
    pub kind: CollectionKind,
    pub id: String,
}

/// Whole-graph consistency failures detected by `FlowBuilder::build`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphIntegrityError {
    #[error(
        "Edge '{edge_id}' on node '{source_node_id}' points to '{missing_node_id}', which is not in the flow"
    )]
    UnresolvedDestination {
        missing_node_id: String,
        source_node_id: String,
        edge_id: String,
    },

    #[error("No node is flagged as the start node")]
    MissingStartNode,

    #[error("Only one start node is allowed, found: {}", .0.join(", "))]
    MultipleStartNodes(Vec<String>),

    #[error("Node '{node_id}' references tool '{tool_ref}', which is not in the flow")]
    DanglingToolReference { node_id: String, tool_ref: String },

    #[error("Edge identifier '{edge_id}' is used more than once (second use on node '{node_id}')")]
    DuplicateEdgeId { edge_id: String, node_id: String },
}

/// Inconsistencies inside a tool's parameter schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Tool '{tool_id}' requires '{field}' at '{path}', but it is not declared in properties")]
    UndeclaredRequiredField {
        tool_id: String,
        path: String,
        field: String,
    },

    #[error("Tool '{tool_id}' lists required field '{field}' more than once at '{path}'")]
    RepeatedRequiredField {
        tool_id: String,
        path: String,
        field: String,
    },
}

/// Failures while emitting the wire document.
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("Unexpected shape at '{path}': {message}")]
    UnexpectedShape { path: String, message: String },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything `FlowBuilder::build` can reject.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error(transparent)]
    GraphIntegrity(#[from] GraphIntegrityError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors that can occur when turning a document or template into a flow.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to parse flow JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    DuplicateId(#[from] DuplicateIdError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Template placeholder '${{{0}}}' has no value")]
    UnknownPlaceholder(String),

    #[error("Could not read template '{path}': {message}")]
    TemplateIo { path: String, message: String },
}

/// Errors reported by a `FlowDeployer`.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Deployment rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("I/O failure while deploying to '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Umbrella error for callers that drive every phase in one go.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    DuplicateId(#[from] DuplicateIdError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}
