//! The wire document exchanged with the voice-agent platform.
//!
//! [`FlowDocument`] is a structural transcription of a [`Flow`]: the same field
//! names and nesting, with node, edge, tool, and schema-property order kept as
//! declared. Parsing goes the other way through [`IntoFlow`], which re-runs
//! entity validation and the full graph build.

use crate::error::{ConversionError, SerializationError};
use crate::flow::{DisplayPosition, Flow, ModelChoice, Node, Speaker, Tool};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

mod conversion;

pub use conversion::IntoFlow;

/// Serializable form of a conversation flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_flow_id: Option<String>,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub global_prompt: String,
    pub language: String,
    pub voice_id: String,
    pub start_node_id: String,
    #[serde(default)]
    pub start_speaker: Speaker,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_choice: Option<ModelChoice>,
    #[serde(default)]
    pub knowledge_base_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_tag_display_position: Option<DisplayPosition>,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default)]
    pub is_published: bool,
}

impl FlowDocument {
    pub fn from_flow(flow: &Flow) -> Self {
        Self {
            conversation_flow_id: flow.conversation_flow_id().map(str::to_string),
            version: flow.version(),
            global_prompt: flow.global_prompt().to_string(),
            language: flow.language().to_string(),
            voice_id: flow.voice_id().to_string(),
            start_node_id: flow.start_node_id().to_string(),
            start_speaker: flow.start_speaker(),
            model_choice: flow.model_choice().cloned(),
            knowledge_base_ids: flow.knowledge_base_ids().to_vec(),
            begin_tag_display_position: flow.begin_tag_display_position(),
            nodes: flow.nodes().to_vec(),
            tools: flow.tools().to_vec(),
            is_published: flow.is_published(),
        }
    }

    /// Parses a document. The result is not validated until it is turned
    /// into a flow with [`IntoFlow`].
    pub fn from_json(json: &str) -> Result<Self, ConversionError> {
        let document: FlowDocument = serde_json::from_str(json)?;
        debug!(
            nodes = document.nodes.len(),
            tools = document.tools.len(),
            "parsed flow document"
        );
        Ok(document)
    }

    /// Serializes into a JSON value and checks it has the shape the platform
    /// expects.
    pub fn to_value(&self) -> Result<Value, SerializationError> {
        let value = serde_json::to_value(self)?;
        validate_shape(&value)?;
        Ok(value)
    }

    pub fn to_json(&self) -> Result<String, SerializationError> {
        Ok(serde_json::to_string(&self.to_value()?)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SerializationError> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }
}

impl Flow {
    /// The wire document for this flow.
    pub fn to_document(&self) -> FlowDocument {
        FlowDocument::from_flow(self)
    }
}

impl From<&Flow> for FlowDocument {
    fn from(flow: &Flow) -> Self {
        FlowDocument::from_flow(flow)
    }
}

/// Checks that an emitted document carries every required key with the
/// expected JSON type.
pub fn validate_shape(document: &Value) -> Result<(), SerializationError> {
    let root = as_object(document, "$")?;
    for key in ["global_prompt", "language", "voice_id", "start_node_id"] {
        require_key(root, "$", key, Value::is_string, "a string")?;
    }
    if root.contains_key("conversation_flow_id") {
        require_key(root, "$", "conversation_flow_id", Value::is_string, "a string")?;
    }
    if root.contains_key("version") {
        require_key(root, "$", "version", Value::is_u64, "a version number")?;
    }
    if root.contains_key("is_published") {
        require_key(root, "$", "is_published", Value::is_boolean, "a boolean")?;
    }
    if let Some(position) = root.get("begin_tag_display_position") {
        check_position(position, "$.begin_tag_display_position")?;
    }

    let nodes = require_key(root, "$", "nodes", Value::is_array, "an array")?;
    for (i, node) in nodes.as_array().into_iter().flatten().enumerate() {
        check_node(node, &format!("$.nodes[{}]", i))?;
    }

    let tools = require_key(root, "$", "tools", Value::is_array, "an array")?;
    for (i, tool) in tools.as_array().into_iter().flatten().enumerate() {
        let path = format!("$.tools[{}]", i);
        let tool = as_object(tool, &path)?;
        for key in ["id", "name", "url", "method"] {
            require_key(tool, &path, key, Value::is_string, "a string")?;
        }
        require_key(tool, &path, "parameters", Value::is_object, "an object")?;
    }
    Ok(())
}

fn check_node(node: &Value, path: &str) -> Result<(), SerializationError> {
    let node = as_object(node, path)?;
    for key in ["id", "name", "type"] {
        require_key(node, path, key, Value::is_string, "a string")?;
    }
    if let Some(instruction) = node.get("instruction") {
        let path = format!("{}.instruction", path);
        let instruction = as_object(instruction, &path)?;
        require_key(instruction, &path, "type", Value::is_string, "a string")?;
        require_key(instruction, &path, "text", Value::is_string, "a string")?;
    }
    let position = require_key(node, path, "display_position", Value::is_object, "an object")?;
    check_position(position, &format!("{}.display_position", path))?;

    let edges = require_key(node, path, "edges", Value::is_array, "an array")?
        .as_array()
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(i, edge)| (format!("{}.edges[{}]", path, i), edge));
    let fallbacks = ["else_edge", "skip_response_edge"]
        .into_iter()
        .filter_map(|key| node.get(key).map(|edge| (format!("{}.{}", path, key), edge)));
    for (edge_path, edge) in edges.chain(fallbacks) {
        check_edge(edge, &edge_path)?;
    }
    Ok(())
}

fn check_edge(edge: &Value, path: &str) -> Result<(), SerializationError> {
    let edge = as_object(edge, path)?;
    require_key(edge, path, "id", Value::is_string, "a string")?;
    require_key(edge, path, "destination_node_id", Value::is_string, "a string")?;
    require_key(edge, path, "transition_condition", Value::is_object, "an object")?;
    Ok(())
}

fn check_position(position: &Value, path: &str) -> Result<(), SerializationError> {
    let position = as_object(position, path)?;
    require_key(position, path, "x", Value::is_number, "a finite number")?;
    require_key(position, path, "y", Value::is_number, "a finite number")?;
    Ok(())
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SerializationError> {
    value.as_object().ok_or_else(|| SerializationError::UnexpectedShape {
        path: path.to_string(),
        message: format!("expected an object, found {}", json_type(value)),
    })
}

fn require_key<'a>(
    object: &'a Map<String, Value>,
    path: &str,
    key: &str,
    is_expected: fn(&Value) -> bool,
    expected: &str,
) -> Result<&'a Value, SerializationError> {
    let shape_error = |message: String| SerializationError::UnexpectedShape {
        path: format!("{}.{}", path, key),
        message,
    };
    match object.get(key) {
        Some(value) if is_expected(value) => Ok(value),
        Some(value) => Err(shape_error(format!(
            "expected {}, found {}",
            expected,
            json_type(value)
        ))),
        None => Err(shape_error("required key is missing".to_string())),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
