//! Core types and traits for the Memora agent toolkit

pub mod error;
pub mod message;
pub mod traits;
pub mod types;

pub use error::{AgentError, Result};
pub use message::{ChatMessage, Role};
pub use traits::llm::{LLMError, LLMProvider};
pub use traits::memory::{DEFAULT_USER_ID, MemoryHit, MemoryRecord, MemoryStore};
pub use traits::tool::{Tool, ToolInfo, ToolResult};
pub use traits::tracker::{ExperimentTracker, ModelCard, ModelReference};
pub use types::{AgentInfo, FinishReason, LLMConfig, LLMResponse, TokenUsage, ToolCall};
