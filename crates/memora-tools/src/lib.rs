//! Tool registry, memory tools and built-in tools for Memora

pub mod builtin;
mod memory;
mod registry;

pub use builtin::{
    CurrentTimeTool, DeleteMemoryTool, GetAllMemoriesTool, SearchMemoriesTool, StoreMemoryTool,
    UpdateMemoryTool,
};
pub use memora_core::{Tool, ToolInfo, ToolResult};
pub use memory::{DEFAULT_SEARCH_LIMIT, MemoryTools};
pub use registry::ToolRegistry;

use memora_core::AgentError;
use schemars::JsonSchema;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),
    #[error("Duplicate tool id: {0}")]
    Duplicate(String),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl From<ToolError> for AgentError {
    fn from(err: ToolError) -> Self {
        AgentError::Tool(err.to_string())
    }
}

pub fn generate_schema<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({}))
}
