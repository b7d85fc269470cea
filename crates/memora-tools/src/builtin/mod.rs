mod memory;
mod time;

pub use memory::{
    DeleteMemoryTool, GetAllMemoriesTool, SearchMemoriesTool, StoreMemoryTool, UpdateMemoryTool,
};
pub use time::CurrentTimeTool;

use memora_core::{Result, ToolResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize tool arguments, treating `null` as an empty object.
///
/// A malformed payload comes back as the soft-failure result to return.
pub fn parse_input<T: DeserializeOwned>(args: Value) -> std::result::Result<T, ToolResult> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolResult::error(format!("Invalid input: {}", e)))
}

/// Turn an operation result into a tool result. Recoverable errors become
/// observations; the rest propagate.
pub fn into_observation(result: Result<String>) -> Result<ToolResult> {
    match result {
        Ok(text) => Ok(ToolResult::ok(text)),
        Err(e) if e.is_recoverable() => Ok(ToolResult::error(e.to_string())),
        Err(e) => Err(e),
    }
}
