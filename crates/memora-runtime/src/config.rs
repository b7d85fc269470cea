//! Agent configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use memora_core::{AgentError, DEFAULT_USER_ID, LLMConfig, Result};
use memora_reasoning::ReasoningSystem;
use memora_tracking::TrackingConfig;

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_MAX_ITERS: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// `provider/model`, e.g. `openai/gpt-4o-mini`.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub reasoning_system: ReasoningSystem,

    /// Upper bound on ReAct steps. Ignored by the single-call strategies.
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,

    #[serde(default)]
    pub observability: bool,

    #[serde(default = "default_user_id")]
    pub default_user_id: String,

    #[serde(default)]
    pub llm: LLMConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Settings this version does not interpret.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_iters() -> usize {
    DEFAULT_MAX_ITERS
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            reasoning_system: ReasoningSystem::default(),
            max_iters: DEFAULT_MAX_ITERS,
            observability: false,
            default_user_id: default_user_id(),
            llm: LLMConfig::default(),
            tracking: TrackingConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl AgentConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AgentConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(AgentError::IoError)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(AgentError::Config("model cannot be empty".to_string()));
        }
        if self.max_iters == 0 {
            return Err(AgentError::Config(
                "max_iters must be greater than 0".to_string(),
            ));
        }
        if self.default_user_id.trim().is_empty() {
            return Err(AgentError::Config(
                "default_user_id cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
