//! Unit tests for individual model pieces and the outline renderer.
mod common;
use common::*;
use kaiwa::prelude::*;
use std::str::FromStr;

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_tags_parse_and_display() {
        for node_type in NodeType::ALL {
            assert_eq!(NodeType::from_str(node_type.as_str()).unwrap(), *node_type);
        }
        assert_eq!(HttpMethod::from_str("PATCH").unwrap(), HttpMethod::Patch);
        assert_eq!(ComparisonOperator::NotContains.to_string(), "not_contains");
        assert_eq!(
            NodeType::from_str("function_call").unwrap_err(),
            ValidationError::UnknownTag {
                kind: "node type",
                value: "function_call".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_identifiers_are_rejected() {
        let err = Node::conversation("", "Nameless", "Hola").build().unwrap_err();
        assert!(matches!(err, ValidationError::EmptyField { field: "id", .. }));

        let err = Node::conversation("n1", " ", "Hola").build().unwrap_err();
        assert!(matches!(err, ValidationError::EmptyField { field: "name", .. }));

        let err = Edge::prompt("e1", "", "Siempre").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::EmptyField { field: "destination_node_id", .. }
        ));
    }

    #[test]
    fn test_non_finite_node_position_is_rejected() {
        let err = Node::end("end", "End", "Adiós")
            .position(f64::NAN, 0.0)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::NonFiniteCoordinate {
                node_id: "end".to_string(),
                axis: 'x',
            }
        );
    }

    #[test]
    fn test_tool_timeout_must_be_positive() {
        let err = Tool::builder("t1", "notify", WEBHOOK)
            .timeout_ms(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::ZeroTimeout { tool_id: "t1".to_string() });
    }

    #[test]
    fn test_node_type_field_rules() {
        let err = Node::builder("n1", "Extract", NodeType::ExtractDynamicVariables)
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::NodeRule { .. }));

        let err = Node::conversation("n2", "Talk", "Hola")
            .tool("tool-1")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("only function nodes"));

        let transfer = Node::builder("n3", "Transfer", NodeType::TransferCall)
            .transfer_to("+34910000000")
            .build()
            .unwrap();
        assert!(transfer.is_terminal());
    }

    #[test]
    fn test_flow_lookups() {
        let flow = booking_builder().build().unwrap();
        assert_eq!(flow.start_node().name(), "Welcome");
        assert_eq!(flow.node("route").map(|n| n.node_type()), Some(NodeType::Branch));
        assert!(flow.tool("tool-book").is_some());
        assert!(flow.tool("missing").is_none());
        let terminal: Vec<_> = flow.terminal_nodes().map(|n| n.id()).collect();
        assert_eq!(terminal, ["transfer", "end"]);
    }

    #[test]
    fn test_outline_lists_nodes_edges_and_tools() {
        let flow = booking_builder().build().unwrap();
        let outline = flow.outline().to_string();

        assert!(outline.starts_with("Flow: 6 nodes, 6 edges, 1 tools (2 terminal)\n"));
        assert!(outline.contains("[conversation] welcome \"Welcome\" (start)"));
        assert!(outline.contains("    1. e-interested -> extract: Muestra interés"));
        assert!(outline.contains("    2. e-busy -> end: No tiene tiempo"));
        assert!(outline.contains("    extracts: tipo_curso, motivation"));
        assert!(outline.contains("    1. e-private -> book: {{tipo_curso}} == privado"));
        assert!(outline.contains("    else. e-else -> transfer"));
        assert!(outline.contains("[function] book \"Book\" -> tool book_calendar"));
        assert!(outline.contains("[end] end \"End Call\" (terminal)"));
        assert!(outline.contains(&format!(
            "  book_calendar POST {} (requires customer_name, meeting_datetime)",
            WEBHOOK
        )));
    }

    #[test]
    fn test_outline_shows_skip_response_edges() {
        let mut builder = welcome_builder();
        builder
            .add_node(
                Node::conversation("wait", "Wait", "¿Sigues ahí?")
                    .skip_response_edge(Edge::prompt("e-silent", "callback", "Silencio").unwrap())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let outline = builder.build().unwrap().outline().to_string();
        assert!(outline.contains("[conversation] wait \"Wait\"\n    silent. e-silent -> callback"));
    }

    #[test]
    fn test_outline_truncates_long_conditions() {
        let flow = welcome_builder().build().unwrap();
        let outline = flow.outline().condition_width(10).to_string();
        assert!(outline.contains("    1. yes -> qualify: El usua..."));
    }
}
