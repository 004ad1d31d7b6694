//! Rendering the embedded ESI template and user-supplied templates.
mod common;
use common::*;
use kaiwa::prelude::*;
use kaiwa::settings::{DEFAULT_LANGUAGE, DEFAULT_VOICE_ID, DEFAULT_WEBHOOK_URL};
use std::io::Write;

const MINIMAL_TEMPLATE: &str = r#"{
    "global_prompt": "Hola desde ${school}",
    "language": "${language}",
    "voice_id": "${voice_id}",
    "start_node_id": "only",
    "nodes": [
        { "id": "only", "name": "Only", "type": "end",
          "instruction": { "type": "prompt", "text": "Adiós" } }
    ],
    "tools": [
        { "id": "t1", "name": "notify", "type": "custom", "method": "POST",
          "url": "${webhook_url}",
          "parameters": { "type": "object", "properties": {}, "required": [] } }
    ]
}"#;

fn esi_settings() -> FlowSettings {
    FlowSettings {
        webhook_url: WEBHOOK.to_string(),
        ..FlowSettings::default()
    }
}

#[cfg(test)]
mod template_tests {
    use super::*;

    #[test]
    fn test_esi_template_builds_with_defaults() {
        let flow = FlowTemplate::esi_design_school()
            .unwrap()
            .render_flow(&FlowSettings::default())
            .expect("ESI template should build");

        assert_eq!(flow.nodes().len(), 6);
        assert_eq!(flow.tools().len(), 5);
        assert_eq!(flow.start_node_id(), "start-node-1752593222665");
        assert_eq!(flow.language(), DEFAULT_LANGUAGE);
        assert_eq!(flow.voice_id(), DEFAULT_VOICE_ID);
        assert!(flow.tools().iter().all(|t| t.url() == DEFAULT_WEBHOOK_URL));
        assert!(flow.global_prompt().starts_with("## IDENTIDAD Y CONTEXTO"));
        assert_eq!(flow.model_choice(), Some(&ModelChoice::cascading("gpt-4.1")));
        assert_eq!(flow.conversation_flow_id(), Some("conversation_flow_esi_python"));
        assert_eq!(flow.version(), 0);
        assert!(!flow.is_published());
    }

    #[test]
    fn test_esi_template_uses_configured_settings() {
        let settings = FlowSettings {
            language: "en-US".to_string(),
            voice_id: "voice-2".to_string(),
            ..esi_settings()
        };
        let flow = FlowTemplate::esi_design_school()
            .unwrap()
            .render_flow(&settings)
            .unwrap();

        assert_eq!(flow.language(), "en-US");
        assert_eq!(flow.voice_id(), "voice-2");
        for tool in flow.tools() {
            assert_eq!(tool.url(), WEBHOOK, "tool {} kept a stale URL", tool.name());
        }
    }

    #[test]
    fn test_esi_welcome_edges_keep_their_order() {
        let flow = FlowTemplate::esi_design_school()
            .unwrap()
            .render_flow(&esi_settings())
            .unwrap();

        let routes: Vec<_> = flow
            .start_node()
            .edges()
            .iter()
            .map(|e| (e.id(), e.destination_node_id()))
            .collect();
        assert_eq!(
            routes,
            [
                ("edge-1", "node-callback"),
                ("edge-2", "node-end"),
                ("edge-3", "node-qualification"),
            ]
        );

        let end = flow.node("node-end").unwrap();
        assert!(end.is_terminal());
        assert_eq!(flow.terminal_nodes().count(), 1);
    }

    #[test]
    fn test_esi_tools_carry_their_schemas() {
        let flow = FlowTemplate::esi_design_school()
            .unwrap()
            .render_flow(&esi_settings())
            .unwrap();

        let privada = flow.tool("book_calendar_privada").unwrap();
        assert_eq!(privada.id(), "tool-1752596037711");
        assert_eq!(privada.parameter_type(), ParameterEncoding::Form);
        assert_eq!(privada.parameters().required().len(), 7);
        assert!(matches!(
            privada.parameters().properties().get("copy_bea"),
            Some(PropertySchema::Boolean { .. })
        ));

        let extract = flow.node("node-extract-variables").unwrap();
        let names: Vec<_> = extract.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["tipo_curso", "experience_level", "motivation"]);
    }

    #[test]
    fn test_custom_variables_fill_placeholders() {
        let template = FlowTemplate::from_json("minimal", MINIMAL_TEMPLATE).unwrap();
        assert_eq!(
            template.placeholders(),
            ["school", "language", "voice_id", "webhook_url"]
        );

        let settings = esi_settings().with_variable("school", "ESI");
        let flow = template.render_flow(&settings).unwrap();
        assert_eq!(flow.global_prompt(), "Hola desde ESI");
        assert_eq!(flow.tools()[0].url(), WEBHOOK);
    }

    #[test]
    fn test_missing_placeholder_value_is_reported() {
        let template = FlowTemplate::from_json("minimal", MINIMAL_TEMPLATE).unwrap();
        let err = template.render(&esi_settings()).unwrap_err();
        assert!(matches!(err, ConversionError::UnknownPlaceholder(ref name) if name == "school"));
        assert_eq!(err.to_string(), "Template placeholder '${school}' has no value");
    }

    #[test]
    fn test_invalid_webhook_url_is_a_validation_error() {
        let settings = FlowSettings {
            webhook_url: "not a url".to_string(),
            ..FlowSettings::default()
        };
        let err = FlowTemplate::esi_design_school()
            .unwrap()
            .render_flow(&settings)
            .unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Validation(ValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_template_from_file() {
        let mut file = tempfile::Builder::new()
            .prefix("campaign")
            .suffix(".json")
            .tempfile()
            .unwrap();
        file.write_all(MINIMAL_TEMPLATE.as_bytes()).unwrap();

        let template = FlowTemplate::from_file(file.path()).unwrap();
        assert!(template.name().starts_with("campaign"));
        let settings = esi_settings().with_variable("school", "ESI");
        assert_eq!(template.render_flow(&settings).unwrap().nodes().len(), 1);
    }

    #[test]
    fn test_missing_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FlowTemplate::from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConversionError::TemplateIo { .. }));
    }
}
