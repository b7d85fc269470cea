//! Memora: memory-aware agents

pub mod agent {
    pub use memora_runtime::{
        AGENT_NAME, AgentBuilder, AgentConfig, AgentInfo, DEFAULT_MAX_ITERS, DEFAULT_MODEL,
        DEFAULT_PREFERENCE_CATEGORY, INPUT_EXAMPLE, MemoryAgent, MemoryShortcuts,
    };
}

pub mod error {
    pub use memora_core::{AgentError, Result};
}

pub mod llm {
    pub use memora_core::{
        ChatMessage, FinishReason, LLMConfig, LLMError, LLMProvider, LLMResponse, Role,
        TokenUsage,
    };
    pub use memora_llm::{MockLLMProvider, ModelRuntime};

    pub mod providers {
        pub use memora_llm::providers::{
            ProviderBuilder, ProviderType, UnifiedLLMProvider, parse_model_string,
        };
    }
}

pub mod memory {
    use std::sync::Arc;

    use memora_core::{AgentError, Result};

    pub use memora_memory::{
        DEFAULT_USER_ID, Embedder, EmbedderSettings, GraphStoreSettings, HashEmbedder,
        InMemoryMemoryStore, LlmSettings, MemoryConfig, MemoryHit, MemoryRecord, MemoryStore,
        VectorMemoryStore, VectorMetric, VectorStoreSettings,
    };

    /// Store for a backend name: `in-memory` or `vector`.
    pub fn create_store(backend: &str, config: &MemoryConfig) -> Result<Arc<dyn MemoryStore>> {
        match backend.trim().to_lowercase().as_str() {
            "in-memory" | "in_memory" | "memory" => Ok(Arc::new(InMemoryMemoryStore::new())),
            "vector" => Ok(Arc::new(VectorMemoryStore::from_config(config))),
            other => Err(AgentError::Config(format!(
                "unknown memory backend: {}",
                other
            ))),
        }
    }
}

pub mod reasoning {
    pub use memora_reasoning::{
        ChainOfThought, FINISH_TOOL, Field, Inputs, Predict, Prediction, ReAct,
        ReasoningStrategy, ReasoningSystem, Signature, TrajectoryStep, build_strategy,
    };
}

pub mod tools {
    pub use memora_tools::{
        CurrentTimeTool, DEFAULT_SEARCH_LIMIT, MemoryTools, Tool, ToolError, ToolInfo,
        ToolRegistry, ToolResult, generate_schema,
    };
}

pub mod tracking {
    pub use memora_tracking::{
        DEFAULT_EXPERIMENT, DEFAULT_TRACKING_DIR, ExperimentTracker, LocalTracker, MlflowTracker,
        ModelCard, ModelReference, TrackingBackend, TrackingConfig, setup_tracking,
    };
}

pub use agent::{AgentBuilder, AgentConfig, MemoryAgent};
pub use error::{AgentError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_store() {
        let config = memory::MemoryConfig::from_lookup(|_| None).unwrap();
        assert_eq!(
            memory::create_store("in-memory", &config).unwrap().backend_name(),
            "in_memory"
        );
        assert_eq!(
            memory::create_store("Vector", &config).unwrap().backend_name(),
            "vector"
        );
        assert!(matches!(
            memory::create_store("pinecone", &config),
            Err(AgentError::Config(_))
        ));
    }
}
