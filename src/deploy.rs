use crate::document::FlowDocument;
use crate::error::DeployError;
use crate::flow::Flow;
use crate::settings::AgentSettings;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// Response-engine tag for conversation-flow agents.
pub const CONVERSATION_FLOW_ENGINE: &str = "conversation-flow";

/// How the platform should run the agent: a versioned conversation flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEngine {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_flow_id: Option<String>,
    pub conversation_flow: FlowDocument,
}

/// The agent-creation payload handed to a [`FlowDeployer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub agent_name: String,
    pub response_engine: ResponseEngine,
    pub voice_id: String,
    pub language: String,
    pub max_call_duration_ms: u64,
    pub interruption_sensitivity: f64,
    pub allow_user_dtmf: bool,
    pub opt_out_sensitive_data_storage: bool,
    pub opt_in_signed_url: bool,
}

impl AgentRequest {
    /// Wraps a built flow in an agent request.
    ///
    /// Voice and language come from the flow so the agent and its flow never
    /// disagree. The flow document is shape-checked here, before any deployer
    /// sees it.
    pub fn new(flow: &Flow, settings: &AgentSettings) -> Result<Self, DeployError> {
        if settings.agent_name.trim().is_empty() {
            return Err(DeployError::Rejected("agent name must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&settings.interruption_sensitivity) {
            return Err(DeployError::Rejected(format!(
                "interruption sensitivity {} is outside 0.0..=1.0",
                settings.interruption_sensitivity
            )));
        }

        let document = flow.to_document();
        document.to_value()?;

        Ok(Self {
            agent_name: settings.agent_name.clone(),
            response_engine: ResponseEngine {
                kind: CONVERSATION_FLOW_ENGINE.to_string(),
                version: document.version,
                conversation_flow_id: document.conversation_flow_id.clone(),
                conversation_flow: document,
            },
            voice_id: flow.voice_id().to_string(),
            language: flow.language().to_string(),
            max_call_duration_ms: settings.max_call_duration_ms,
            interruption_sensitivity: settings.interruption_sensitivity,
            allow_user_dtmf: settings.allow_user_dtmf,
            opt_out_sensitive_data_storage: settings.opt_out_sensitive_data_storage,
            opt_in_signed_url: settings.opt_in_signed_url,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, DeployError> {
        serde_json::to_string_pretty(self).map_err(|e| DeployError::Serialization(e.into()))
    }

    /// A file-name-safe form of the agent name.
    pub fn slug(&self) -> String {
        let slug = self
            .agent_name
            .split(|c: char| !c.is_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(str::to_lowercase)
            .join("-");
        if slug.is_empty() { "agent".to_string() } else { slug }
    }
}

/// What a deployer reports back on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReceipt {
    pub agent_id: String,
    pub agent_name: String,
    /// Where the request was stored, for deployers that write locally.
    pub location: Option<PathBuf>,
}

/// Transmits an agent request somewhere and reports the resulting agent id.
///
/// The library ships local deployers only; a network client for the voice
/// platform implements this trait outside the crate.
pub trait FlowDeployer: Send + Sync {
    fn name(&self) -> &str;

    fn deploy(&self, request: &AgentRequest) -> Result<DeployReceipt, DeployError>;
}

/// Writes each request as pretty JSON into a directory.
///
/// Files are named after the agent slug. Redeploying an agent replaces its
/// file; a different agent whose name maps to the same slug is rejected.
#[derive(Debug, Clone)]
pub struct FileDeployer {
    directory: PathBuf,
}

impl FileDeployer {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl FlowDeployer for FileDeployer {
    fn name(&self) -> &str {
        "file"
    }

    fn deploy(&self, request: &AgentRequest) -> Result<DeployReceipt, DeployError> {
        let io_error = |path: &Path, source| DeployError::Io {
            path: path.display().to_string(),
            source,
        };
        fs::create_dir_all(&self.directory).map_err(|e| io_error(&self.directory, e))?;

        let slug = request.slug();
        let path = self.directory.join(format!("{}.json", slug));
        if path.exists() {
            let existing = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            let owner = serde_json::from_str::<serde_json::Value>(&existing)
                .ok()
                .and_then(|value| value["agent_name"].as_str().map(str::to_string));
            if owner.as_deref() != Some(request.agent_name.as_str()) {
                return Err(DeployError::Rejected(format!(
                    "'{}' already holds a request for another agent ({})",
                    path.display(),
                    owner.as_deref().unwrap_or("unknown")
                )));
            }
            warn!(path = %path.display(), agent = %request.agent_name, "replacing previous request");
        }
        let json = request.to_json_pretty()?;
        fs::write(&path, json).map_err(|e| io_error(&path, e))?;

        Ok(DeployReceipt {
            agent_id: format!("local-{}", slug),
            agent_name: request.agent_name.clone(),
            location: Some(path),
        })
    }
}

/// Keeps requests in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryDeployer {
    requests: Mutex<Vec<AgentRequest>>,
    reject_with: Option<String>,
}

impl MemoryDeployer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A deployer that refuses every request with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reject_with: Some(reason.into()),
        }
    }

    /// Requests accepted so far, oldest first.
    pub fn requests(&self) -> Vec<AgentRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl FlowDeployer for MemoryDeployer {
    fn name(&self) -> &str {
        "memory"
    }

    fn deploy(&self, request: &AgentRequest) -> Result<DeployReceipt, DeployError> {
        if let Some(reason) = &self.reject_with {
            return Err(DeployError::Rejected(reason.clone()));
        }
        let mut requests = self
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        requests.push(request.clone());
        Ok(DeployReceipt {
            agent_id: format!("memory-{}", requests.len()),
            agent_name: request.agent_name.clone(),
            location: None,
        })
    }
}

/// Builds the agent request for `flow` and hands it to `deployer`.
pub fn deploy_flow(
    deployer: &dyn FlowDeployer,
    flow: &Flow,
    settings: &AgentSettings,
) -> Result<DeployReceipt, DeployError> {
    let request = AgentRequest::new(flow, settings)?;
    info!(
        deployer = deployer.name(),
        agent = %request.agent_name,
        summary = %flow.summary(),
        "deploying agent"
    );
    match deployer.deploy(&request) {
        Ok(receipt) => {
            info!(agent_id = %receipt.agent_id, "agent deployed");
            Ok(receipt)
        }
        Err(e) => {
            warn!(deployer = deployer.name(), error = %e, "deployment failed");
            Err(e)
        }
    }
}
