//! Plain configuration values supplied by the caller.
//!
//! The library never reads the environment or configuration files; loaders
//! (such as the `kaiwa-cli` binary) fill these structs in.

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "es-ES";
/// Voice used when none is configured.
pub const DEFAULT_VOICE_ID: &str = "custom_voice_6105206ed083e6faf35d86f533";
/// Webhook receiving tool calls when none is configured.
pub const DEFAULT_WEBHOOK_URL: &str = "https://n8n.zonder.ai/webhook/retell-zonder-esi";

/// Values a template or builder needs to produce a flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSettings {
    pub language: String,
    pub voice_id: String,
    pub webhook_url: String,
    /// Extra template placeholders, looked up after the named settings.
    pub variables: Vec<(String, String)>,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            variables: Vec::new(),
        }
    }
}

impl FlowSettings {
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.variables.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.variables.push((name, value)),
        }
        self
    }

    /// Resolves a template placeholder name.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "language" => Some(self.language.as_str()),
            "voice_id" => Some(self.voice_id.as_str()),
            "webhook_url" => Some(self.webhook_url.as_str()),
            _ => self
                .variables
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
        }
    }
}

/// Agent-level options sent alongside the flow when deploying.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub agent_name: String,
    pub max_call_duration_ms: u64,
    /// Between 0.0 (hard to interrupt) and 1.0 (easily interrupted).
    pub interruption_sensitivity: f64,
    pub allow_user_dtmf: bool,
    pub opt_out_sensitive_data_storage: bool,
    pub opt_in_signed_url: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            agent_name: "ESI Design School Agent".to_string(),
            max_call_duration_ms: 3_600_000,
            interruption_sensitivity: 0.9,
            allow_user_dtmf: true,
            opt_out_sensitive_data_storage: false,
            opt_in_signed_url: false,
        }
    }
}
