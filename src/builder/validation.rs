use crate::error::{BuildError, GraphIntegrityError};
use crate::flow::{Node, Tool};
use ahash::{AHashMap, AHashSet};

/// Whole-graph checks over the builder's collections.
///
/// Conversation flows may loop back to earlier states, so cycles are allowed
/// and never searched for.
pub(super) struct GraphValidator<'a> {
    nodes: &'a [Node],
    tools: &'a [Tool],
    node_index: AHashMap<&'a str, usize>,
    tool_refs: AHashSet<&'a str>,
}

impl<'a> GraphValidator<'a> {
    pub(super) fn new(nodes: &'a [Node], tools: &'a [Tool]) -> Self {
        let node_index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id(), i))
            .collect();
        let tool_refs = tools
            .iter()
            .flat_map(|t| [t.id(), t.name()])
            .collect();
        Self {
            nodes,
            tools,
            node_index,
            tool_refs,
        }
    }

    /// Runs every check and returns the index of the start node.
    pub(super) fn validate(&self) -> Result<usize, BuildError> {
        let start_index = self.find_start_node()?;
        self.check_edge_destinations()?;
        self.check_edge_ids()?;
        self.check_tool_references()?;
        self.check_schemas()?;
        Ok(start_index)
    }

    fn find_start_node(&self) -> Result<usize, GraphIntegrityError> {
        let starts: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_start())
            .map(|(i, _)| i)
            .collect();
        match starts.as_slice() {
            [] => Err(GraphIntegrityError::MissingStartNode),
            [index] => Ok(*index),
            _ => Err(GraphIntegrityError::MultipleStartNodes(
                starts
                    .iter()
                    .map(|&i| self.nodes[i].id().to_string())
                    .collect(),
            )),
        }
    }

    fn check_edge_destinations(&self) -> Result<(), GraphIntegrityError> {
        for node in self.nodes {
            for edge in node.outgoing() {
                if !self.node_index.contains_key(edge.destination_node_id()) {
                    return Err(GraphIntegrityError::UnresolvedDestination {
                        missing_node_id: edge.destination_node_id().to_string(),
                        source_node_id: node.id().to_string(),
                        edge_id: edge.id().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_edge_ids(&self) -> Result<(), GraphIntegrityError> {
        let mut seen = AHashSet::new();
        for node in self.nodes {
            for edge in node.outgoing() {
                if !seen.insert(edge.id()) {
                    return Err(GraphIntegrityError::DuplicateEdgeId {
                        edge_id: edge.id().to_string(),
                        node_id: node.id().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_tool_references(&self) -> Result<(), GraphIntegrityError> {
        for node in self.nodes {
            if let Some(tool_ref) = node.tool_ref() {
                if !self.tool_refs.contains(tool_ref) {
                    return Err(GraphIntegrityError::DanglingToolReference {
                        node_id: node.id().to_string(),
                        tool_ref: tool_ref.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_schemas(&self) -> Result<(), BuildError> {
        for tool in self.tools {
            tool.parameters().check(tool.id())?;
        }
        Ok(())
    }
}
