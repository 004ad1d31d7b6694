use crate::error::{BuildError, CollectionKind, DuplicateIdError, ValidationError};
use crate::flow::{DisplayPosition, Flow, ModelChoice, Node, Speaker, Tool};
use crate::settings::FlowSettings;
use ahash::AHashSet;
use tracing::debug;

mod validation;

use validation::GraphValidator;

/// Assembles nodes, tools, and global settings into a [`Flow`].
///
/// Assembly is append-only: `add_node`/`add_tool` reject identifier collisions
/// without touching the builder. `build` validates the whole graph and returns
/// an independent snapshot, so later mutations never leak into a built flow.
#[derive(Debug, Clone, Default)]
pub struct FlowBuilder {
    conversation_flow_id: Option<String>,
    version: u32,
    is_published: bool,
    global_prompt: String,
    language: String,
    voice_id: String,
    start_speaker: Speaker,
    model_choice: Option<ModelChoice>,
    knowledge_base_ids: Vec<String>,
    begin_tag_display_position: Option<DisplayPosition>,
    nodes: Vec<Node>,
    tools: Vec<Tool>,
    node_ids: AHashSet<String>,
    // Ids and names share one namespace.
    tool_refs: AHashSet<String>,
}

impl FlowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder with language and voice taken from `settings`.
    pub fn with_settings(settings: &FlowSettings) -> Self {
        let mut builder = Self::new();
        builder
            .set_language(settings.language.clone())
            .set_voice(settings.voice_id.clone());
        builder
    }

    /// Appends a node. Fails if a node with the same identifier exists.
    pub fn add_node(&mut self, node: Node) -> Result<&mut Self, DuplicateIdError> {
        if self.node_ids.contains(node.id()) {
            return Err(DuplicateIdError {
                kind: CollectionKind::Node,
                id: node.id().to_string(),
            });
        }
        debug!(node_id = node.id(), node_type = %node.node_type(), "adding node");
        self.node_ids.insert(node.id().to_string());
        self.nodes.push(node);
        Ok(self)
    }

    /// Appends a tool. Nodes reference tools by identifier or by name, so
    /// neither may match the identifier or name of a tool already added.
    pub fn add_tool(&mut self, tool: Tool) -> Result<&mut Self, DuplicateIdError> {
        if self.tool_refs.contains(tool.id()) {
            return Err(DuplicateIdError {
                kind: CollectionKind::Tool,
                id: tool.id().to_string(),
            });
        }
        if self.tool_refs.contains(tool.name()) {
            return Err(DuplicateIdError {
                kind: CollectionKind::ToolName,
                id: tool.name().to_string(),
            });
        }
        debug!(tool_id = tool.id(), tool_name = tool.name(), "adding tool");
        self.tool_refs.insert(tool.id().to_string());
        self.tool_refs.insert(tool.name().to_string());
        self.tools.push(tool);
        Ok(self)
    }

    pub fn set_conversation_flow_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.conversation_flow_id = Some(id.into());
        self
    }

    pub fn set_version(&mut self, version: u32) -> &mut Self {
        self.version = version;
        self
    }

    pub fn set_published(&mut self, published: bool) -> &mut Self {
        self.is_published = published;
        self
    }

    pub fn set_global_prompt(&mut self, text: impl Into<String>) -> &mut Self {
        self.global_prompt = text.into();
        self
    }

    pub fn set_language(&mut self, tag: impl Into<String>) -> &mut Self {
        self.language = tag.into();
        self
    }

    pub fn set_voice(&mut self, id: impl Into<String>) -> &mut Self {
        self.voice_id = id.into();
        self
    }

    pub fn set_start_speaker(&mut self, speaker: Speaker) -> &mut Self {
        self.start_speaker = speaker;
        self
    }

    pub fn set_model_choice(&mut self, choice: ModelChoice) -> &mut Self {
        self.model_choice = Some(choice);
        self
    }

    pub fn add_knowledge_base(&mut self, id: impl Into<String>) -> &mut Self {
        self.knowledge_base_ids.push(id.into());
        self
    }

    pub fn set_begin_tag_position(&mut self, x: f64, y: f64) -> &mut Self {
        self.begin_tag_display_position = Some(DisplayPosition::new(x, y));
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }

    /// True if a tool with this identifier or name was added.
    pub fn contains_tool(&self, reference: &str) -> bool {
        self.tool_refs.contains(reference)
    }

    /// Validates the whole graph and returns an immutable snapshot.
    ///
    /// Checks run in a fixed order and the first failure is returned: start
    /// node, edge destinations, edge identifiers, tool references, parameter
    /// schemas, then the language, voice, and begin-tag settings.
    pub fn build(&self) -> Result<Flow, BuildError> {
        debug!(
            nodes = self.nodes.len(),
            tools = self.tools.len(),
            "validating flow graph"
        );

        let validator = GraphValidator::new(&self.nodes, &self.tools);
        let start_index = validator.validate()?;
        self.check_settings()?;

        let flow = Flow {
            conversation_flow_id: self.conversation_flow_id.clone(),
            version: self.version,
            is_published: self.is_published,
            global_prompt: self.global_prompt.clone(),
            language: self.language.clone(),
            voice_id: self.voice_id.clone(),
            start_index,
            start_speaker: self.start_speaker,
            model_choice: self.model_choice.clone(),
            knowledge_base_ids: self.knowledge_base_ids.clone(),
            begin_tag_display_position: self.begin_tag_display_position,
            nodes: self.nodes.clone(),
            tools: self.tools.clone(),
        };
        debug!(start = flow.start_node_id(), summary = %flow.summary(), "flow built");
        Ok(flow)
    }

    fn check_settings(&self) -> Result<(), ValidationError> {
        if self.language.trim().is_empty() {
            return Err(ValidationError::EmptySetting("language"));
        }
        if self.voice_id.trim().is_empty() {
            return Err(ValidationError::EmptySetting("voice_id"));
        }
        if let Some(position) = self.begin_tag_display_position {
            for (axis, value) in [('x', position.x), ('y', position.y)] {
                if !value.is_finite() {
                    return Err(ValidationError::NonFiniteBeginTag(axis));
                }
            }
        }
        Ok(())
    }
}
