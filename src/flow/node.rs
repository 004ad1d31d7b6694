use super::{Edge, OrderedMap, ToolKind, Validate, require_non_empty};
use crate::error::ValidationError;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

tag_enum! {
    /// The kind of conversational state a node represents.
    NodeType, "node type", {
        Conversation => "conversation",
        Function => "function",
        Branch => "branch",
        ExtractDynamicVariables => "extract_dynamic_variables",
        End => "end",
        TransferCall => "transfer_call",
    }
}

tag_enum! {
    /// Distinguishes free-text prompts from responses spoken verbatim.
    InstructionType, "instruction type", {
        Prompt => "prompt",
        StaticText => "static_text",
    }
}

tag_enum! {
    /// Who speaks first when the conversation starts.
    #[derive(Default)]
    Speaker, "speaker", {
        #[default]
        Agent => "agent",
        User => "user",
    }
}

tag_enum! {
    /// Value type of an extracted dynamic variable.
    VariableType, "variable type", {
        String => "string",
        Number => "number",
        Boolean => "boolean",
        Enum => "enum",
    }
}

tag_enum! {
    /// How a transfer destination is resolved.
    TransferDestinationType, "transfer destination type", {
        Predefined => "predefined",
    }
}

tag_enum! {
    /// Whether the agent stays on the line while a call is handed over.
    TransferOptionType, "transfer option type", {
        ColdTransfer => "cold_transfer",
        WarmTransfer => "warm_transfer",
    }
}

/// What the agent should say or do while in a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    #[serde(rename = "type")]
    pub kind: InstructionType,
    pub text: String,
}

impl Instruction {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            kind: InstructionType::Prompt,
            text: text.into(),
        }
    }

    pub fn static_text(text: impl Into<String>) -> Self {
        Self {
            kind: InstructionType::StaticText,
            text: text.into(),
        }
    }
}

/// Position hint for visual editors. Cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayPosition {
    pub x: f64,
    pub y: f64,
}

impl DisplayPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A dynamic variable extracted from the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: VariableType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl Variable {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: VariableType,
    ) -> Result<Self, ValidationError> {
        let variable = Self {
            name: name.into(),
            description: description.into(),
            kind,
            choices: Vec::new(),
        };
        variable.validate()?;
        Ok(variable)
    }

    /// An `enum` variable restricted to `choices`.
    pub fn choice<I, S>(
        name: impl Into<String>,
        description: impl Into<String>,
        choices: I,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variable = Self {
            name: name.into(),
            description: description.into(),
            kind: VariableType::Enum,
            choices: choices.into_iter().map(Into::into).collect(),
        };
        variable.validate()?;
        Ok(variable)
    }
}

impl Validate for Variable {
    fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |message: &str| ValidationError::InvalidVariable {
            name: self.name.clone(),
            message: message.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        match self.kind {
            VariableType::Enum if self.choices.is_empty() => {
                Err(invalid("enum variables need at least one choice"))
            }
            VariableType::Enum => Ok(()),
            _ if !self.choices.is_empty() => Err(invalid("only enum variables may list choices")),
            _ => Ok(()),
        }
    }
}

/// Where a `transfer_call` node sends the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDestination {
    #[serde(rename = "type")]
    pub kind: TransferDestinationType,
    pub number: String,
}

impl TransferDestination {
    pub fn number(number: impl Into<String>) -> Self {
        Self {
            kind: TransferDestinationType::Predefined,
            number: number.into(),
        }
    }
}

/// How a `transfer_call` node hands the caller over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOption {
    #[serde(rename = "type")]
    pub kind: TransferOptionType,
    #[serde(default)]
    pub show_transferee_as_caller: bool,
}

impl TransferOption {
    pub fn cold() -> Self {
        Self {
            kind: TransferOptionType::ColdTransfer,
            show_transferee_as_caller: false,
        }
    }

    pub fn warm() -> Self {
        Self {
            kind: TransferOptionType::WarmTransfer,
            show_transferee_as_caller: false,
        }
    }
}

/// A single conversational state.
///
/// Outgoing edges are kept in declaration order; the platform tries them in
/// that order and takes the first whose condition matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    id: String,
    name: String,
    #[serde(rename = "type")]
    node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instruction: Option<Instruction>,
    #[serde(default)]
    display_position: DisplayPosition,
    #[serde(default)]
    edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    else_edge: Option<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    skip_response_edge: Option<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_speaker: Option<Speaker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_type: Option<ToolKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speak_during_execution: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wait_for_result: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    variables: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transfer_destination: Option<TransferDestination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transfer_option: Option<TransferOption>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    custom_sip_headers: OrderedMap<String>,
    // Carried on the wire as the flow-level `start_node_id`.
    #[serde(skip)]
    start: bool,
}

impl Node {
    pub fn builder(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> NodeBuilder {
        NodeBuilder::new(id, name, node_type)
    }

    /// A `conversation` node driven by a free-text prompt.
    pub fn conversation(
        id: impl Into<String>,
        name: impl Into<String>,
        prompt: impl Into<String>,
    ) -> NodeBuilder {
        NodeBuilder::new(id, name, NodeType::Conversation).instruction(Instruction::prompt(prompt))
    }

    /// An `end` node that closes the call with a prompt.
    pub fn end(
        id: impl Into<String>,
        name: impl Into<String>,
        prompt: impl Into<String>,
    ) -> NodeBuilder {
        NodeBuilder::new(id, name, NodeType::End).instruction(Instruction::prompt(prompt))
    }

    /// A `function` node that invokes the tool identified by `tool_ref`.
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        tool_ref: impl Into<String>,
    ) -> NodeBuilder {
        NodeBuilder::new(id, name, NodeType::Function).tool(tool_ref)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn instruction(&self) -> Option<&Instruction> {
        self.instruction.as_ref()
    }

    pub fn display_position(&self) -> DisplayPosition {
        self.display_position
    }

    /// Outgoing edges in evaluation order, excluding the else edge.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn else_edge(&self) -> Option<&Edge> {
        self.else_edge.as_ref()
    }

    /// Taken when the user stays silent instead of answering.
    pub fn skip_response_edge(&self) -> Option<&Edge> {
        self.skip_response_edge.as_ref()
    }

    /// Every outgoing edge: declared edges, then the else edge, then the
    /// skip-response edge.
    pub fn outgoing(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .chain(self.else_edge.iter())
            .chain(self.skip_response_edge.iter())
    }

    pub fn is_start(&self) -> bool {
        self.start
    }

    pub fn start_speaker(&self) -> Option<Speaker> {
        self.start_speaker
    }

    /// The tool a `function` node invokes, by id or name.
    pub fn tool_ref(&self) -> Option<&str> {
        self.tool_id.as_deref()
    }

    pub fn tool_type(&self) -> Option<ToolKind> {
        self.tool_type
    }

    pub fn speak_during_execution(&self) -> Option<bool> {
        self.speak_during_execution
    }

    pub fn wait_for_result(&self) -> Option<bool> {
        self.wait_for_result
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn transfer_destination(&self) -> Option<&TransferDestination> {
        self.transfer_destination.as_ref()
    }

    pub fn transfer_option(&self) -> Option<&TransferOption> {
        self.transfer_option.as_ref()
    }

    /// SIP headers attached when a call is transferred.
    pub fn custom_sip_headers(&self) -> &OrderedMap<String> {
        &self.custom_sip_headers
    }

    /// A node with zero outgoing edges ends the conversation.
    pub fn is_terminal(&self) -> bool {
        self.outgoing().next().is_none()
    }

    pub(crate) fn set_start(&mut self, start: bool) {
        self.start = start;
    }

    fn rule_violation(&self, message: &str) -> ValidationError {
        ValidationError::NodeRule {
            node_id: self.id.clone(),
            node_type: self.node_type.to_string(),
            message: message.to_string(),
        }
    }

    fn check_type_rules(&self) -> Result<(), ValidationError> {
        match self.node_type {
            NodeType::Conversation | NodeType::End if self.instruction.is_none() => {
                return Err(self.rule_violation("an instruction is required"));
            }
            NodeType::Function if self.tool_id.as_deref().is_none_or(|t| t.trim().is_empty()) => {
                return Err(self.rule_violation("a tool reference is required"));
            }
            NodeType::ExtractDynamicVariables if self.variables.is_empty() => {
                return Err(self.rule_violation("at least one variable is required"));
            }
            NodeType::TransferCall
                if self
                    .transfer_destination
                    .as_ref()
                    .is_none_or(|d| d.number.trim().is_empty()) =>
            {
                return Err(self.rule_violation("a transfer destination number is required"));
            }
            NodeType::End if !self.is_terminal() => {
                return Err(self.rule_violation("end nodes cannot have outgoing edges"));
            }
            NodeType::Branch if self.is_terminal() => {
                return Err(self.rule_violation("branch nodes need at least one outgoing edge"));
            }
            _ => {}
        }

        if self.node_type != NodeType::Function && (self.tool_id.is_some() || self.tool_type.is_some()) {
            return Err(self.rule_violation("only function nodes can reference a tool"));
        }
        if self.node_type != NodeType::ExtractDynamicVariables && !self.variables.is_empty() {
            return Err(self.rule_violation("only extract_dynamic_variables nodes declare variables"));
        }
        if self.node_type != NodeType::TransferCall && self.transfer_destination.is_some() {
            return Err(self.rule_violation("only transfer_call nodes have a transfer destination"));
        }
        if self.node_type != NodeType::TransferCall
            && (self.transfer_option.is_some() || !self.custom_sip_headers.is_empty())
        {
            return Err(self.rule_violation("only transfer_call nodes take transfer options or SIP headers"));
        }
        Ok(())
    }
}

impl Validate for Node {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.id, "node", &self.id, "id")?;
        require_non_empty(&self.name, "node", &self.id, "name")?;
        if let Some(instruction) = &self.instruction {
            require_non_empty(&instruction.text, "node", &self.id, "instruction.text")?;
        }
        for (axis, value) in [('x', self.display_position.x), ('y', self.display_position.y)] {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteCoordinate {
                    node_id: self.id.clone(),
                    axis,
                });
            }
        }
        for edge in self.outgoing() {
            edge.validate()?;
        }

        let mut seen = AHashSet::new();
        for variable in &self.variables {
            variable.validate()?;
            if !seen.insert(variable.name.as_str()) {
                return Err(ValidationError::InvalidVariable {
                    name: variable.name.clone(),
                    message: format!("declared more than once on node '{}'", self.id),
                });
            }
        }

        self.check_type_rules()
    }
}

/// Assembles a [`Node`] and validates it on `build`.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        let wait_for_result = (node_type == NodeType::Function).then_some(true);
        let speak_during_execution = (node_type == NodeType::Function).then_some(false);
        Self {
            node: Node {
                id: id.into(),
                name: name.into(),
                node_type,
                instruction: None,
                display_position: DisplayPosition::default(),
                edges: Vec::new(),
                else_edge: None,
                skip_response_edge: None,
                start_speaker: None,
                tool_id: None,
                tool_type: None,
                speak_during_execution,
                wait_for_result,
                variables: Vec::new(),
                transfer_destination: None,
                transfer_option: None,
                custom_sip_headers: OrderedMap::new(),
                start: false,
            },
        }
    }

    pub fn instruction(mut self, instruction: Instruction) -> Self {
        self.node.instruction = Some(instruction);
        self
    }

    pub fn prompt(self, text: impl Into<String>) -> Self {
        self.instruction(Instruction::prompt(text))
    }

    pub fn static_text(self, text: impl Into<String>) -> Self {
        self.instruction(Instruction::static_text(text))
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.node.display_position = DisplayPosition::new(x, y);
        self
    }

    /// Appends an outgoing edge after the ones already declared.
    pub fn edge(mut self, edge: Edge) -> Self {
        self.node.edges.push(edge);
        self
    }

    pub fn edges(mut self, edges: impl IntoIterator<Item = Edge>) -> Self {
        self.node.edges.extend(edges);
        self
    }

    pub fn else_edge(mut self, edge: Edge) -> Self {
        self.node.else_edge = Some(edge);
        self
    }

    pub fn skip_response_edge(mut self, edge: Edge) -> Self {
        self.node.skip_response_edge = Some(edge);
        self
    }

    /// Flags this node as the flow's start node.
    pub fn start(mut self) -> Self {
        self.node.start = true;
        self
    }

    pub fn start_speaker(mut self, speaker: Speaker) -> Self {
        self.node.start_speaker = Some(speaker);
        self
    }

    pub fn tool(mut self, tool_ref: impl Into<String>) -> Self {
        self.node.tool_id = Some(tool_ref.into());
        self
    }

    pub fn tool_type(mut self, kind: ToolKind) -> Self {
        self.node.tool_type = Some(kind);
        self
    }

    pub fn speak_during_execution(mut self, speak: bool) -> Self {
        self.node.speak_during_execution = Some(speak);
        self
    }

    pub fn wait_for_result(mut self, wait: bool) -> Self {
        self.node.wait_for_result = Some(wait);
        self
    }

    pub fn variable(mut self, variable: Variable) -> Self {
        self.node.variables.push(variable);
        self
    }

    pub fn transfer_to(mut self, number: impl Into<String>) -> Self {
        self.node.transfer_destination = Some(TransferDestination::number(number));
        self
    }

    pub fn transfer_option(mut self, option: TransferOption) -> Self {
        self.node.transfer_option = Some(option);
        self
    }

    pub fn sip_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.node.custom_sip_headers.insert(name, value.into());
        self
    }

    pub fn build(self) -> Result<Node, ValidationError> {
        self.node.validate()?;
        Ok(self.node)
    }
}
