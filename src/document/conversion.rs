use super::FlowDocument;
use crate::builder::FlowBuilder;
use crate::error::ConversionError;
use crate::flow::{Flow, Validate};

/// A source format that can be turned into a [`FlowBuilder`].
///
/// This is the extension point for flow formats other than [`FlowDocument`]:
/// implement `into_builder` to translate your own structs into nodes, tools,
/// and settings, and `into_flow` runs the usual graph validation on top.
///
/// # Example
///
/// ```rust,no_run
/// use kaiwa::prelude::*;
///
/// struct Script { steps: Vec<(String, String)> }
///
/// impl IntoFlow for Script {
///     fn into_builder(self) -> Result<FlowBuilder, ConversionError> {
///         let mut builder = FlowBuilder::new();
///         builder.set_language("en-US").set_voice("voice-1");
///         for (i, (id, text)) in self.steps.into_iter().enumerate() {
///             let mut node = Node::end(id.clone(), id, text);
///             if i == 0 {
///                 node = node.start();
///             }
///             builder.add_node(node.build()?)?;
///         }
///         Ok(builder)
///     }
/// }
/// ```
pub trait IntoFlow {
    /// Consumes the source and assembles a builder from it.
    fn into_builder(self) -> Result<FlowBuilder, ConversionError>;

    /// Assembles and builds in one step.
    fn into_flow(self) -> Result<Flow, ConversionError>
    where
        Self: Sized,
    {
        Ok(self.into_builder()?.build()?)
    }
}

impl IntoFlow for FlowDocument {
    fn into_builder(self) -> Result<FlowBuilder, ConversionError> {
        let mut builder = FlowBuilder::new();
        builder
            .set_version(self.version)
            .set_published(self.is_published)
            .set_global_prompt(self.global_prompt)
            .set_language(self.language)
            .set_voice(self.voice_id)
            .set_start_speaker(self.start_speaker);
        if let Some(id) = self.conversation_flow_id {
            builder.set_conversation_flow_id(id);
        }
        if let Some(choice) = self.model_choice {
            builder.set_model_choice(choice);
        }
        for id in self.knowledge_base_ids {
            builder.add_knowledge_base(id);
        }
        if let Some(position) = self.begin_tag_display_position {
            builder.set_begin_tag_position(position.x, position.y);
        }

        for tool in self.tools {
            tool.validate()?;
            builder.add_tool(tool)?;
        }
        for mut node in self.nodes {
            node.validate()?;
            node.set_start(node.id() == self.start_node_id);
            builder.add_node(node)?;
        }
        Ok(builder)
    }
}

impl FlowDocument {
    /// Parses and builds a flow from JSON text.
    pub fn parse_flow(json: &str) -> Result<Flow, ConversionError> {
        FlowDocument::from_json(json)?.into_flow()
    }
}
