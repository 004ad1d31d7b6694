//! Serialization to the wire document and the parse path back into a flow.
mod common;
use common::*;
use kaiwa::prelude::*;
use serde_json::json;

fn position_of(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("'{}' not found in document", needle))
}

#[cfg(test)]
mod document_tests {
    use super::*;

    #[test]
    fn test_round_trip_is_lossless() {
        let flow = booking_builder().build().unwrap();
        let json = flow.to_document().to_json().unwrap();
        let parsed = FlowDocument::parse_flow(&json).expect("emitted document should parse");
        assert_eq!(parsed, flow);
        assert_eq!(parsed.to_document().to_json().unwrap(), json);
    }

    #[test]
    fn test_edge_and_property_order_are_preserved() {
        let flow = booking_builder().build().unwrap();
        let json = flow.to_document().to_json_pretty().unwrap();

        assert!(position_of(&json, "\"e-interested\"") < position_of(&json, "\"e-busy\""));
        let properties = [
            "\"customer_name\"",
            "\"meeting_datetime\"",
            "\"meeting_type\"",
            "\"copy_bea\"",
            "\"slot\"",
        ];
        for pair in properties.windows(2) {
            assert!(
                position_of(&json, pair[0]) < position_of(&json, pair[1]),
                "{} should precede {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_document_field_names_match_the_platform() {
        let flow = booking_builder().build().unwrap();
        let value = flow.to_document().to_value().unwrap();

        assert_eq!(value["start_node_id"], "welcome");
        assert_eq!(value["start_speaker"], "agent");
        assert_eq!(value["model_choice"], json!({ "type": "cascading", "model": "gpt-4.1" }));
        assert_eq!(value["knowledge_base_ids"], json!(["kb-courses"]));
        assert_eq!(value["begin_tag_display_position"], json!({ "x": 122.0, "y": 333.0 }));

        let welcome = &value["nodes"][0];
        assert_eq!(welcome["instruction"], json!({ "type": "prompt", "text": "Preséntate como Bea." }));
        assert_eq!(
            welcome["edges"][0]["transition_condition"],
            json!({ "type": "prompt", "prompt": "Muestra interés" })
        );

        let extract = &value["nodes"][1];
        assert_eq!(extract["type"], "extract_dynamic_variables");
        assert!(extract.get("instruction").is_none());
        assert_eq!(extract["variables"][0]["choices"], json!(["online", "privado"]));

        let route = &value["nodes"][2];
        assert_eq!(
            route["edges"][0]["transition_condition"],
            json!({
                "type": "equation",
                "equations": [{ "left": "{{tipo_curso}}", "operator": "==", "right": "privado" }],
                "operator": "&&"
            })
        );
        assert_eq!(route["else_edge"]["destination_node_id"], "transfer");

        let book = &value["nodes"][3];
        assert_eq!(book["tool_id"], "book_calendar");
        assert_eq!(book["wait_for_result"], true);

        let transfer = &value["nodes"][4];
        assert_eq!(
            transfer["transfer_destination"],
            json!({ "type": "predefined", "number": "+34910000000" })
        );

        let tool = &value["tools"][0];
        assert_eq!(tool["id"], "tool-book");
        assert_eq!(tool["method"], "POST");
        assert_eq!(tool["parameter_type"], "form");
        assert_eq!(tool["timeout_ms"], 120000);
        assert_eq!(tool["parameters"]["required"], json!(["customer_name", "meeting_datetime"]));
        assert_eq!(
            tool["parameters"]["properties"]["meeting_type"]["enum"],
            json!(["presencial", "videollamada"])
        );
        assert_eq!(tool["response_variables"], json!({ "booking_id": "$.id" }));
        assert!(tool.get("headers").is_none());
    }

    #[test]
    fn test_legacy_tool_id_key_parses() {
        let json = json!({
            "language": "es-ES",
            "voice_id": "v",
            "start_node_id": "start",
            "nodes": [
                { "id": "start", "name": "Start", "type": "function", "tool_id": "tool-1",
                  "edges": [{ "id": "e1", "destination_node_id": "end",
                              "transition_condition": { "type": "prompt", "prompt": "Hecho" } }] },
                { "id": "end", "name": "End", "type": "end",
                  "instruction": { "type": "static_text", "text": "Adiós" } }
            ],
            "tools": [
                { "tool_id": "tool-1", "name": "check", "description": "Comprobar",
                  "type": "custom", "method": "POST", "url": WEBHOOK,
                  "parameters": { "type": "object", "properties": {}, "required": [] } }
            ]
        });
        let flow = FlowDocument::parse_flow(&json.to_string()).unwrap();
        assert_eq!(flow.tools()[0].id(), "tool-1");
        assert_eq!(flow.global_prompt(), "");
        assert_eq!(flow.start_node().node_type(), NodeType::Function);
    }

    #[test]
    fn test_unknown_node_type_fails_to_parse() {
        let json = json!({
            "language": "es-ES", "voice_id": "v", "start_node_id": "a",
            "nodes": [{ "id": "a", "name": "A", "type": "teleport" }]
        });
        let err = FlowDocument::parse_flow(&json.to_string()).unwrap_err();
        assert!(matches!(err, ConversionError::JsonParse(_)));
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn test_parsed_entities_are_revalidated() {
        let json = json!({
            "language": "es-ES", "voice_id": "v", "start_node_id": "a",
            "nodes": [
                { "id": "a", "name": "A", "type": "end",
                  "instruction": { "type": "prompt", "text": "Adiós" },
                  "edges": [{ "id": "e1", "destination_node_id": "a",
                              "transition_condition": { "type": "prompt", "prompt": "Otra vez" } }] }
            ]
        });
        let err = FlowDocument::parse_flow(&json.to_string()).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Validation(ValidationError::NodeRule { ref node_id, .. }) if node_id == "a"
        ));
    }

    #[test]
    fn test_unknown_start_node_id_fails_build() {
        let mut document = welcome_builder().build().unwrap().to_document();
        document.start_node_id = "nobody".to_string();
        let err = document.into_flow().unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Build(BuildError::GraphIntegrity(GraphIntegrityError::MissingStartNode))
        ));
    }

    #[test]
    fn test_non_finite_begin_tag_fails_build() {
        let mut builder = welcome_builder();
        builder.set_begin_tag_position(f64::NAN, 10.0);
        assert_eq!(
            builder.build().unwrap_err(),
            BuildError::Validation(ValidationError::NonFiniteBeginTag('x'))
        );

        builder.set_begin_tag_position(0.0, f64::NEG_INFINITY);
        assert_eq!(
            builder.build().unwrap_err(),
            BuildError::Validation(ValidationError::NonFiniteBeginTag('y'))
        );
    }

    #[test]
    fn test_fractional_coordinates_survive_round_trip() {
        let mut xs: Vec<f64> = (0..400u64)
            .map(|i| (i * 104_729 % 1_300_000) as f64 / 7.0 + 0.123456789)
            .collect();
        xs.push(180426.98059964614);

        for x in xs {
            let mut builder = FlowBuilder::new();
            builder
                .set_language("es-ES")
                .set_voice("v")
                .set_begin_tag_position(x / 3.0, x * 0.1);
            builder
                .add_node(Node::end("only", "Only", "Adiós").start().position(x, x * 3.3).build().unwrap())
                .unwrap();
            let flow = builder.build().unwrap();

            let json = flow.to_document().to_json().unwrap();
            let parsed = FlowDocument::parse_flow(&json).unwrap();
            assert_eq!(parsed, flow, "coordinate {} changed on the way back", x);
        }
    }

    #[test]
    fn test_flow_metadata_and_skip_response_edge_round_trip() {
        let mut builder = welcome_builder();
        builder
            .set_conversation_flow_id("conversation_flow_esi")
            .set_version(3)
            .set_published(true);
        builder
            .add_node(
                Node::conversation("nudge", "Nudge", "¿Sigues ahí?")
                    .edge(Edge::prompt("nudge-yes", "qualify", "Responde").unwrap())
                    .skip_response_edge(Edge::prompt("nudge-silent", "callback", "Silencio").unwrap())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        builder
            .add_node(
                Node::builder("handoff", "Handoff", NodeType::TransferCall)
                    .transfer_to("+34910000000")
                    .transfer_option(TransferOption::warm())
                    .sip_header("X-Lead-Source", "web")
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let flow = builder.build().unwrap();

        let value = flow.to_document().to_value().unwrap();
        assert_eq!(value["conversation_flow_id"], "conversation_flow_esi");
        assert_eq!(value["version"], 3);
        assert_eq!(value["is_published"], true);
        assert_eq!(value["nodes"][3]["skip_response_edge"]["destination_node_id"], "callback");
        assert_eq!(
            value["nodes"][4]["transfer_option"],
            json!({ "type": "warm_transfer", "show_transferee_as_caller": false })
        );
        assert_eq!(value["nodes"][4]["custom_sip_headers"], json!({ "X-Lead-Source": "web" }));

        let parsed = FlowDocument::parse_flow(&value.to_string()).unwrap();
        assert_eq!(parsed, flow);
        assert_eq!(parsed.conversation_flow_id(), Some("conversation_flow_esi"));
    }

    #[test]
    fn test_unrecognised_keys_are_rejected() {
        let node = json!({ "id": "a", "name": "A", "type": "end",
                           "instruction": { "type": "prompt", "text": "Adiós" } });

        let mut top_level = json!({
            "language": "es-ES", "voice_id": "v", "start_node_id": "a", "nodes": [node.clone()]
        });
        top_level["default_dynamic_variables"] = json!({});
        let err = FlowDocument::parse_flow(&top_level.to_string()).unwrap_err();
        assert!(matches!(err, ConversionError::JsonParse(_)));
        assert!(err.to_string().contains("default_dynamic_variables"));

        let mut odd_node = node.clone();
        odd_node["interruptible"] = json!(true);
        let err = FlowDocument::parse_flow(
            &json!({ "language": "es-ES", "voice_id": "v", "start_node_id": "a", "nodes": [odd_node] })
                .to_string(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("interruptible"));

        let edge_with_extra = json!({
            "language": "es-ES", "voice_id": "v", "start_node_id": "b",
            "nodes": [node, { "id": "b", "name": "B", "type": "conversation",
                "instruction": { "type": "prompt", "text": "Hola" },
                "edges": [{ "id": "e1", "destination_node_id": "a", "priority": 1,
                            "transition_condition": { "type": "prompt", "prompt": "Fin" } }] }]
        });
        let err = FlowDocument::parse_flow(&edge_with_extra.to_string()).unwrap_err();
        assert!(err.to_string().contains("priority"));
    }
}
