use std::sync::Arc;
use tracing::debug;

use memora_core::{ChatMessage, LLMConfig, LLMError, LLMProvider, LLMResponse};

use crate::providers::UnifiedLLMProvider;

/// The language model an agent talks to, with its sampling parameters.
///
/// Strategies receive this handle explicitly instead of reaching for a
/// process-wide default model.
#[derive(Clone)]
pub struct ModelRuntime {
    provider: Arc<dyn LLMProvider>,
    config: LLMConfig,
}

impl ModelRuntime {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            config: LLMConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LLMConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a runtime for a `"provider/model"` identifier.
    pub fn from_model(model: &str, config: LLMConfig) -> Result<Self, LLMError> {
        let provider = UnifiedLLMProvider::from_model_string(model)?;
        Ok(Self::new(Arc::new(provider)).with_config(config))
    }

    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<LLMResponse, LLMError> {
        debug!(
            provider = self.provider.provider_name(),
            messages = messages.len(),
            "Sending completion request"
        );
        let response = self.provider.complete(messages, Some(&self.config)).await?;
        if let Some(usage) = &response.usage {
            debug!(total_tokens = usage.total_tokens, "Completion received");
        }
        Ok(response)
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.provider.model_name()
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }
}

impl std::fmt::Debug for ModelRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRuntime")
            .field("provider", &self.provider.provider_name())
            .field("config", &self.config)
            .finish()
    }
}
