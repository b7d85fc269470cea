use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use memora_core::{
    ChatMessage, FinishReason, LLMConfig, LLMError, LLMProvider, LLMResponse, Role, TokenUsage,
};

/// Backends reachable through the `llm` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    Anthropic,
    /// Local models, no key required
    Ollama,
    DeepSeek,
    XAI,
    Groq,
    Google,
    Mistral,
}

impl ProviderType {
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::DeepSeek => Some("DEEPSEEK_API_KEY"),
            Self::XAI => Some("XAI_API_KEY"),
            Self::Groq => Some("GROQ_API_KEY"),
            Self::Google => Some("GOOGLE_API_KEY"),
            Self::Mistral => Some("MISTRAL_API_KEY"),
            Self::Ollama => None,
        }
    }

    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::Ollama => Some("http://localhost:11434"),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
            Self::DeepSeek => "deepseek",
            Self::XAI => "xai",
            Self::Groq => "groq",
            Self::Google => "google",
            Self::Mistral => "mistral",
        }
    }

    fn to_llm_backend(self) -> llm::builder::LLMBackend {
        match self {
            Self::OpenAI => llm::builder::LLMBackend::OpenAI,
            Self::Anthropic => llm::builder::LLMBackend::Anthropic,
            Self::Ollama => llm::builder::LLMBackend::Ollama,
            Self::DeepSeek => llm::builder::LLMBackend::DeepSeek,
            Self::XAI => llm::builder::LLMBackend::XAI,
            Self::Google => llm::builder::LLMBackend::Google,
            Self::Groq => llm::builder::LLMBackend::Groq,
            Self::Mistral => llm::builder::LLMBackend::Mistral,
        }
    }
}

impl FromStr for ProviderType {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "deepseek" => Ok(Self::DeepSeek),
            "xai" => Ok(Self::XAI),
            "groq" => Ok(Self::Groq),
            "google" | "gemini" => Ok(Self::Google),
            "mistral" => Ok(Self::Mistral),
            other => Err(LLMError::Config(format!("unknown provider type: {}", other))),
        }
    }
}

/// Split `"provider/model"` into its parts. A bare model name is an OpenAI model.
pub fn parse_model_string(model: &str) -> Result<(ProviderType, String), LLMError> {
    let model = model.trim();
    if model.is_empty() {
        return Err(LLMError::Config("model name is empty".to_string()));
    }

    match model.split_once('/') {
        Some((provider, name)) if !name.is_empty() => Ok((provider.parse()?, name.to_string())),
        Some(_) => Err(LLMError::ModelNotFound(model.to_string())),
        None => Ok((ProviderType::OpenAI, model.to_string())),
    }
}

#[derive(Debug)]
pub struct UnifiedLLMProvider {
    provider_type: ProviderType,
    model: String,
    api_key: Option<String>,
    base_url: Option<String>,
}

impl UnifiedLLMProvider {
    pub fn new(
        provider_type: ProviderType,
        model: String,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, LLMError> {
        let api_key = match (api_key, provider_type.api_key_env_var()) {
            (Some(key), _) => Some(key),
            (None, Some(env_var)) => Some(std::env::var(env_var).map_err(|_| {
                LLMError::Config(format!(
                    "API key not found in environment variable {}",
                    env_var
                ))
            })?),
            (None, None) => None,
        };

        let base_url =
            base_url.or_else(|| provider_type.default_base_url().map(|s| s.to_string()));

        Ok(Self {
            provider_type,
            model,
            api_key,
            base_url,
        })
    }

    pub fn from_env(
        provider_type: ProviderType,
        model: impl Into<String>,
    ) -> Result<Self, LLMError> {
        Self::new(provider_type, model.into(), None, None)
    }

    /// Resolve a `"provider/model"` identifier such as `"openai/gpt-4o-mini"`,
    /// reading the API key from the provider's environment variable.
    pub fn from_model_string(model: &str) -> Result<Self, LLMError> {
        let (provider_type, name) = parse_model_string(model)?;
        Self::from_env(provider_type, name)
    }

    pub fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn convert_message(msg: &ChatMessage) -> llm::chat::ChatMessage {
        match msg.role {
            Role::System | Role::User => {
                llm::chat::ChatMessage::user().content(&msg.content).build()
            }
            Role::Assistant => llm::chat::ChatMessage::assistant()
                .content(&msg.content)
                .build(),
            Role::Tool => llm::chat::ChatMessage::user()
                .content(format!("Observation: {}", msg.content))
                .build(),
        }
    }

    fn build_llm(&self, config: Option<&LLMConfig>) -> Result<Box<dyn llm::LLMProvider>, LLMError> {
        let mut builder = llm::builder::LLMBuilder::new()
            .backend(self.provider_type.to_llm_backend())
            .model(&self.model);

        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.api_key(key);
        }

        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }

        if let Some(cfg) = config {
            if let Some(temp) = cfg.temperature {
                builder = builder.temperature(temp);
            }
            if let Some(max_tok) = cfg.max_tokens {
                builder = builder.max_tokens(max_tok);
            }
            if let Some(top_p) = cfg.top_p {
                builder = builder.top_p(top_p);
            }
        }

        builder
            .build()
            .map_err(|e| LLMError::Config(format!("Failed to build LLM: {}", e)))
    }
}

#[async_trait]
impl LLMProvider for UnifiedLLMProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        config: Option<&LLMConfig>,
    ) -> Result<LLMResponse, LLMError> {
        let llm_messages: Vec<llm::chat::ChatMessage> =
            messages.iter().map(Self::convert_message).collect();

        let llm = self.build_llm(config)?;

        let response = llm.chat(&llm_messages).await.map_err(|e| LLMError::API {
            message: format!("LLM provider error: {}", e),
            status: None,
        })?;

        let content = response.text().unwrap_or_default();
        let mut result = LLMResponse::new(content, FinishReason::Stop).with_model(&self.model);
        if let Some(u) = response.usage() {
            result = result.with_usage(TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            });
        }

        Ok(result)
    }

    fn provider_name(&self) -> &str {
        self.provider_type.as_str()
    }

    fn model_name(&self) -> Option<&str> {
        Some(&self.model)
    }
}

#[derive(Default)]
pub struct ProviderBuilder {
    provider_type: Option<ProviderType>,
    model: Option<String>,
    api_key: Option<String>,
    api_key_env: Option<String>,
    base_url: Option<String>,
}

impl ProviderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider_type: ProviderType) -> Self {
        self.provider_type = Some(provider_type);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn api_key_env(mut self, env_var: impl Into<String>) -> Self {
        self.api_key_env = Some(env_var.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn build(self) -> Result<UnifiedLLMProvider, LLMError> {
        let provider_type = self
            .provider_type
            .ok_or_else(|| LLMError::Config("Provider type not set".to_string()))?;

        let model = self
            .model
            .ok_or_else(|| LLMError::Config("Model not set".to_string()))?;

        let api_key = match (self.api_key, self.api_key_env) {
            (Some(key), _) => Some(key),
            (None, Some(env_var)) => Some(std::env::var(&env_var).map_err(|_| {
                LLMError::Config(format!("API key environment variable {} not found", env_var))
            })?),
            (None, None) => None,
        };

        UnifiedLLMProvider::new(provider_type, model, api_key, self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let provider = ProviderBuilder::new()
            .provider(ProviderType::OpenAI)
            .model("gpt-4o-mini")
            .api_key("sk-test")
            .build()
            .unwrap();

        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model_name(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_builder_requires_model() {
        let result = ProviderBuilder::new().provider(ProviderType::Ollama).build();
        assert!(matches!(result, Err(LLMError::Config(_))));
    }

    #[test]
    fn test_ollama_defaults() {
        let provider =
            UnifiedLLMProvider::new(ProviderType::Ollama, "llama3".into(), None, None).unwrap();
        assert_eq!(provider.base_url(), Some("http://localhost:11434"));
    }

    #[test]
    fn test_provider_type_from_str() {
        assert_eq!("OpenAI".parse::<ProviderType>().unwrap(), ProviderType::OpenAI);
        assert_eq!("gemini".parse::<ProviderType>().unwrap(), ProviderType::Google);
        assert!("nope".parse::<ProviderType>().is_err());
    }

    #[test]
    fn test_parse_model_string() {
        let (provider, name) = parse_model_string("openai/gpt-4o-mini").unwrap();
        assert_eq!(provider, ProviderType::OpenAI);
        assert_eq!(name, "gpt-4o-mini");

        let (provider, name) = parse_model_string("gpt-4o").unwrap();
        assert_eq!(provider, ProviderType::OpenAI);
        assert_eq!(name, "gpt-4o");

        let (provider, name) = parse_model_string("ollama/llama3:8b").unwrap();
        assert_eq!(provider, ProviderType::Ollama);
        assert_eq!(name, "llama3:8b");

        assert!(parse_model_string("").is_err());
        assert!(parse_model_string("openai/").is_err());
        assert!(parse_model_string("unknown/model").is_err());
    }

    #[test]
    fn test_from_model_string_without_key_needs_nothing_for_ollama() {
        let provider = UnifiedLLMProvider::from_model_string("ollama/llama3").unwrap();
        assert_eq!(provider.provider_type(), ProviderType::Ollama);
    }
}
