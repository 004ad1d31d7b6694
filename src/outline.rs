use crate::flow::{Flow, Node};
use itertools::Itertools;
use std::fmt;

const DEFAULT_CONDITION_WIDTH: usize = 72;

/// Human-readable outline of a flow: nodes in declaration order with their
/// edges in evaluation order, followed by the tool list.
pub struct FlowOutline<'a> {
    flow: &'a Flow,
    condition_width: usize,
}

impl<'a> FlowOutline<'a> {
    pub fn new(flow: &'a Flow) -> Self {
        Self {
            flow,
            condition_width: DEFAULT_CONDITION_WIDTH,
        }
    }

    /// Maximum number of characters shown per transition condition.
    pub fn condition_width(mut self, width: usize) -> Self {
        self.condition_width = width.max(4);
        self
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, node: &Node) -> fmt::Result {
        let mut flags = Vec::new();
        if node.is_start() {
            flags.push("start");
        }
        if node.is_terminal() {
            flags.push("terminal");
        }
        write!(f, "[{}] {} \"{}\"", node.node_type(), node.id(), node.name())?;
        if !flags.is_empty() {
            write!(f, " ({})", flags.join(", "))?;
        }
        if let Some(tool) = node.tool_ref() {
            write!(f, " -> tool {}", tool)?;
        }
        writeln!(f)?;

        if !node.variables().is_empty() {
            let names = node.variables().iter().map(|v| v.name.as_str()).join(", ");
            writeln!(f, "    extracts: {}", names)?;
        }
        for (i, edge) in node.edges().iter().enumerate() {
            writeln!(
                f,
                "    {}. {} -> {}: {}",
                i + 1,
                edge.id(),
                edge.destination_node_id(),
                truncate(&edge.transition_condition().describe(), self.condition_width)
            )?;
        }
        if let Some(edge) = node.else_edge() {
            writeln!(f, "    else. {} -> {}", edge.id(), edge.destination_node_id())?;
        }
        if let Some(edge) = node.skip_response_edge() {
            writeln!(f, "    silent. {} -> {}", edge.id(), edge.destination_node_id())?;
        }
        Ok(())
    }
}

impl fmt::Display for FlowOutline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flow = self.flow;
        writeln!(f, "Flow: {}", flow.summary())?;
        writeln!(f, "Language: {} | Voice: {}", flow.language(), flow.voice_id())?;
        writeln!(f, "Start: {} ({} speaks first)", flow.start_node_id(), flow.start_speaker())?;
        writeln!(f)?;

        for node in flow.nodes() {
            self.write_node(f, node)?;
        }

        if !flow.tools().is_empty() {
            writeln!(f)?;
            writeln!(f, "Tools:")?;
            for tool in flow.tools() {
                write!(f, "  {} {} {}", tool.name(), tool.method(), tool.url())?;
                let required = tool.parameters().required();
                if !required.is_empty() {
                    write!(f, " (requires {})", required.iter().join(", "))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl Flow {
    pub fn outline(&self) -> FlowOutline<'_> {
        FlowOutline::new(self)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_multibyte_characters() {
        assert_eq!(truncate("¿Cuándo sería mejor?", 10), "¿Cuándo...");
        assert_eq!(truncate("corto", 10), "corto");
    }
}
