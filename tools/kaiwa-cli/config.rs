use clap::Args;
use kaiwa::settings::{AgentSettings, DEFAULT_LANGUAGE, DEFAULT_VOICE_ID, DEFAULT_WEBHOOK_URL, FlowSettings};

/// Placeholder value shipped in sample `.env` files.
const SAMPLE_API_KEY: &str = "your_retell_api_key_here";

/// Settings substituted into the flow template.
#[derive(Args, Debug, Clone)]
pub struct FlowArgs {
    /// Language tag of the agent
    #[arg(long, env = "KAIWA_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Voice identifier on the platform
    #[arg(long, env = "KAIWA_VOICE_ID", default_value = DEFAULT_VOICE_ID)]
    pub voice_id: String,

    /// Webhook receiving every tool call
    #[arg(long, env = "N8N_WEBHOOK_URL", default_value = DEFAULT_WEBHOOK_URL)]
    pub webhook_url: String,

    /// Extra template placeholder, as NAME=VALUE (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_key_val)]
    pub vars: Vec<(String, String)>,
}

impl FlowArgs {
    pub fn to_settings(&self) -> FlowSettings {
        self.vars.iter().fold(
            FlowSettings {
                language: self.language.clone(),
                voice_id: self.voice_id.clone(),
                webhook_url: self.webhook_url.clone(),
                variables: Vec::new(),
            },
            |settings, (name, value)| settings.with_variable(name, value),
        )
    }
}

/// Agent-level options used when deploying.
#[derive(Args, Debug, Clone)]
pub struct AgentArgs {
    /// Name of the agent to create
    #[arg(long, env = "AGENT_NAME", default_value = "ESI Design School Agent")]
    pub agent_name: String,

    /// Platform API key
    #[arg(long, env = "RETELL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Maximum call duration in milliseconds
    #[arg(long, default_value_t = 3_600_000)]
    pub max_call_duration_ms: u64,

    /// How easily the caller can interrupt the agent (0.0 - 1.0)
    #[arg(long, default_value_t = 0.9)]
    pub interruption_sensitivity: f64,
}

impl AgentArgs {
    pub fn to_settings(&self) -> AgentSettings {
        AgentSettings {
            agent_name: self.agent_name.clone(),
            max_call_duration_ms: self.max_call_duration_ms,
            interruption_sensitivity: self.interruption_sensitivity,
            ..AgentSettings::default()
        }
    }

    /// Fails unless a real API key is configured. The key itself is never
    /// echoed back.
    pub fn require_api_key(&self) -> Result<(), String> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() && key != SAMPLE_API_KEY => Ok(()),
            _ => Err("RETELL_API_KEY is not set; export it or pass --api-key".to_string()),
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    if name.trim().is_empty() {
        return Err(format!("placeholder name is empty in '{}'", s));
    }
    Ok((name.trim().to_string(), value.to_string()))
}
