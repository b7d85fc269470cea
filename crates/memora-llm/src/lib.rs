//! LLM providers and the model runtime handle for Memora

pub mod mock;
pub mod providers;
mod runtime;

pub use memora_core::{
    ChatMessage, FinishReason, LLMConfig, LLMError, LLMProvider, LLMResponse, Role, TokenUsage,
};
pub use mock::MockLLMProvider;
pub use providers::{ProviderBuilder, ProviderType, UnifiedLLMProvider};
pub use runtime::ModelRuntime;
