//! Error type shared by every Memora crate

use thiserror::Error;

use crate::traits::llm::LLMError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Unsupported reasoning system: {0}. Expected one of: react, cot, basic")]
    UnsupportedReasoningSystem(String),

    #[error("Memory is not configured for this agent")]
    MemoryNotConfigured,

    #[error("Memory not found: {0}")]
    NotFound(String),

    #[error("Memory store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Observability is disabled for this agent")]
    ObservabilityDisabled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Failed to parse model output: {0}")]
    Parse(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Tracking error: {0}")]
    Tracking(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<LLMError> for AgentError {
    fn from(err: LLMError) -> Self {
        AgentError::LLM(err.to_string())
    }
}

impl AgentError {
    /// Errors that describe a caller or model mistake rather than a broken
    /// collaborator. A reasoning loop may feed these back as observations.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AgentError::InvalidInput(_) | AgentError::NotFound(_) | AgentError::Parse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_conversion() {
        let err: AgentError = LLMError::Network("connection reset".into()).into();
        assert!(matches!(err, AgentError::LLM(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(AgentError::NotFound("abc".into()).is_recoverable());
        assert!(AgentError::InvalidInput("empty".into()).is_recoverable());
        assert!(!AgentError::StoreUnavailable("down".into()).is_recoverable());
        assert!(!AgentError::MemoryNotConfigured.is_recoverable());
    }

    #[test]
    fn test_unsupported_reasoning_message() {
        let err = AgentError::UnsupportedReasoningSystem("tree".into());
        assert!(err.to_string().contains("tree"));
        assert!(err.to_string().contains("react, cot, basic"));
    }
}
