use super::{OrderedMap, ParameterSchema, Validate, require_non_empty};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use url::Url;

/// Timeout applied to tool calls when none is given.
pub const DEFAULT_TOOL_TIMEOUT_MS: u64 = 120_000;

tag_enum! {
    /// Who executes the tool.
    #[derive(Default)]
    ToolKind, "tool type", {
        #[default]
        Custom => "custom",
        Local => "local",
    }
}

tag_enum! {
    /// HTTP method used to invoke a tool.
    #[derive(Default)]
    HttpMethod, "HTTP method", {
        Get => "GET",
        #[default]
        Post => "POST",
        Put => "PUT",
        Patch => "PATCH",
        Delete => "DELETE",
    }
}

tag_enum! {
    /// How tool arguments are encoded in the request body.
    #[derive(Default)]
    ParameterEncoding, "parameter type", {
        #[default]
        Json => "json",
        Form => "form",
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TOOL_TIMEOUT_MS
}

/// An external callable (webhook) the agent may invoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(alias = "tool_id")]
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type", default)]
    kind: ToolKind,
    #[serde(default)]
    method: HttpMethod,
    url: String,
    #[serde(default)]
    parameter_type: ParameterEncoding,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
    #[serde(default)]
    parameters: ParameterSchema,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    headers: OrderedMap<String>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    query_params: OrderedMap<String>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    response_variables: OrderedMap<String>,
}

impl Tool {
    pub fn builder(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> ToolBuilder {
        ToolBuilder::new(id, name, url)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn parameter_type(&self) -> ParameterEncoding {
        self.parameter_type
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn parameters(&self) -> &ParameterSchema {
        &self.parameters
    }

    pub fn headers(&self) -> &OrderedMap<String> {
        &self.headers
    }

    pub fn query_params(&self) -> &OrderedMap<String> {
        &self.query_params
    }

    pub fn response_variables(&self) -> &OrderedMap<String> {
        &self.response_variables
    }
}

impl Validate for Tool {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.id, "tool", &self.id, "id")?;
        require_non_empty(&self.name, "tool", &self.id, "name")?;
        require_non_empty(&self.url, "tool", &self.id, "url")?;

        let invalid_url = |message: String| ValidationError::InvalidUrl {
            tool_id: self.id.clone(),
            url: self.url.clone(),
            message,
        };
        let parsed = Url::parse(&self.url).map_err(|e| invalid_url(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid_url(format!(
                "scheme '{}' is not supported",
                parsed.scheme()
            )));
        }

        if self.timeout_ms == 0 {
            return Err(ValidationError::ZeroTimeout {
                tool_id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Assembles a [`Tool`] and validates it on `build`.
///
/// The parameter schema is not checked here; `FlowBuilder::build` checks
/// required-field consistency for every tool.
#[derive(Debug, Clone)]
pub struct ToolBuilder {
    tool: Tool,
}

impl ToolBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            tool: Tool {
                id: id.into(),
                name: name.into(),
                description: String::new(),
                kind: ToolKind::default(),
                method: HttpMethod::default(),
                url: url.into(),
                parameter_type: ParameterEncoding::default(),
                timeout_ms: DEFAULT_TOOL_TIMEOUT_MS,
                parameters: ParameterSchema::default(),
                headers: OrderedMap::new(),
                query_params: OrderedMap::new(),
                response_variables: OrderedMap::new(),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.tool.description = description.into();
        self
    }

    pub fn kind(mut self, kind: ToolKind) -> Self {
        self.tool.kind = kind;
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.tool.method = method;
        self
    }

    pub fn parameter_type(mut self, encoding: ParameterEncoding) -> Self {
        self.tool.parameter_type = encoding;
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.tool.timeout_ms = timeout_ms;
        self
    }

    pub fn parameters(mut self, schema: impl Into<ParameterSchema>) -> Self {
        self.tool.parameters = schema.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tool.headers.insert(name, value.into());
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tool.query_params.insert(name, value.into());
        self
    }

    /// Maps a dynamic variable to a JSON path in the tool's response.
    pub fn response_variable(mut self, variable: impl Into<String>, path: impl Into<String>) -> Self {
        self.tool.response_variables.insert(variable, path.into());
        self
    }

    pub fn build(self) -> Result<Tool, ValidationError> {
        self.tool.validate()?;
        Ok(self.tool)
    }
}
