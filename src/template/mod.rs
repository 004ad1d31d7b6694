//! Declarative flow templates.
//!
//! A template is a [`FlowDocument`] in JSON form whose string values may carry
//! `${name}` placeholders. Rendering substitutes them from [`FlowSettings`] and
//! parses the result, so the builder stays generic and the ESI script is data.

use crate::document::{FlowDocument, IntoFlow};
use crate::error::ConversionError;
use crate::flow::Flow;
use crate::settings::FlowSettings;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

const ESI_DESIGN_SCHOOL: &str = include_str!("esi_design_school.json");

/// A flow document with unresolved `${name}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowTemplate {
    name: String,
    source: Value,
}

impl FlowTemplate {
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, ConversionError> {
        Ok(Self {
            name: name.into(),
            source: serde_json::from_str(json)?,
        })
    }

    /// Loads a template from disk; its name is the file stem.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConversionError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConversionError::TemplateIo {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_json(name, &json)
    }

    /// The ESI Design School lead-qualification flow: six nodes and five
    /// webhook tools, every tool pointing at `${webhook_url}`.
    pub fn esi_design_school() -> Result<Self, ConversionError> {
        Self::from_json("esi_design_school", ESI_DESIGN_SCHOOL)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct placeholder names, in order of first appearance.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_placeholders(&self.source, &mut names);
        names
    }

    /// Substitutes every placeholder and parses the result.
    pub fn render(&self, settings: &FlowSettings) -> Result<FlowDocument, ConversionError> {
        let mut value = self.source.clone();
        expand_value(&mut value, settings)?;
        let document: FlowDocument = serde_json::from_value(value)?;
        debug!(
            template = %self.name,
            nodes = document.nodes.len(),
            tools = document.tools.len(),
            "rendered template"
        );
        Ok(document)
    }

    /// Renders and builds in one step.
    pub fn render_flow(&self, settings: &FlowSettings) -> Result<Flow, ConversionError> {
        self.render(settings)?.into_flow()
    }
}

fn expand_value(value: &mut Value, settings: &FlowSettings) -> Result<(), ConversionError> {
    match value {
        Value::String(text) if text.contains("${") => {
            *text = expand_placeholders(text, |name| settings.lookup(name))?;
        }
        Value::Array(items) => {
            for item in items {
                expand_value(item, settings)?;
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                expand_value(item, settings)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Replaces `${name}` with the value returned by `lookup`. An unterminated
/// `${` is kept as written.
fn expand_placeholders<'a, F>(input: &str, lookup: F) -> Result<String, ConversionError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            result.push_str(&rest[start..]);
            return Ok(result);
        };
        let name = &after[..end];
        let replacement =
            lookup(name).ok_or_else(|| ConversionError::UnknownPlaceholder(name.to_string()))?;
        result.push_str(replacement);
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    Ok(result)
}

fn collect_placeholders(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            let mut rest = text.as_str();
            while let Some(start) = rest.find("${") {
                let after = &rest[start + 2..];
                let Some(end) = after.find('}') else { break };
                let name = &after[..end];
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
                rest = &after[end + 1..];
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_placeholders(v, names)),
        Value::Object(map) => map.values().for_each(|v| collect_placeholders(v, names)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<&'static str> {
        match name {
            "host" => Some("hooks.example.com"),
            _ => None,
        }
    }

    #[test]
    fn expands_known_placeholders() {
        let out = expand_placeholders("https://${host}/a/${host}", lookup).unwrap();
        assert_eq!(out, "https://hooks.example.com/a/hooks.example.com");
    }

    #[test]
    fn unterminated_placeholder_is_left_alone() {
        let out = expand_placeholders("cost ${5", lookup).unwrap();
        assert_eq!(out, "cost ${5");
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let err = expand_placeholders("${nope}", lookup).unwrap_err();
        assert!(matches!(err, ConversionError::UnknownPlaceholder(ref n) if n == "nope"));
    }

    #[test]
    fn embedded_template_lists_its_placeholders() {
        let template = FlowTemplate::esi_design_school().unwrap();
        assert_eq!(
            template.placeholders(),
            vec!["language", "voice_id", "webhook_url"]
        );
    }
}
