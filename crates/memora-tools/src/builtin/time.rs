use async_trait::async_trait;
use chrono::Local;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use memora_core::{Result, Tool, ToolResult};

use super::parse_input;
use crate::generate_schema;

pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reports the local wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentTimeTool;

impl CurrentTimeTool {
    pub fn new() -> Self {
        Self
    }

    pub fn now() -> String {
        Local::now().format(DEFAULT_TIME_FORMAT).to_string()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CurrentTimeInput {
    /// Optional strftime format, defaults to '%Y-%m-%d %H:%M:%S'
    #[serde(default)]
    format: Option<String>,
}

#[async_trait]
impl Tool for CurrentTimeTool {
    fn id(&self) -> &str {
        "get_current_time"
    }

    fn name(&self) -> &str {
        "Current Time"
    }

    fn description(&self) -> &str {
        "Get the current date and time."
    }

    fn input_schema(&self) -> Value {
        generate_schema::<CurrentTimeInput>()
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let input: CurrentTimeInput = match parse_input(args) {
            Ok(input) => input,
            Err(result) => return Ok(result),
        };

        let format = input.format.as_deref().filter(|f| !f.trim().is_empty());
        if let Some(format) = format {
            // chrono reports unknown specifiers through fmt::Error at render time
            let mut rendered = String::new();
            if std::fmt::write(&mut rendered, format_args!("{}", Local::now().format(format)))
                .is_err()
            {
                return Ok(ToolResult::error(format!("Invalid time format: {}", format)));
            }
            return Ok(ToolResult::ok(rendered));
        }

        Ok(ToolResult::ok(Self::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[tokio::test]
    async fn test_default_format() {
        let result = CurrentTimeTool::new()
            .execute(serde_json::json!({}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(NaiveDateTime::parse_from_str(&result.output, DEFAULT_TIME_FORMAT).is_ok());
    }

    #[tokio::test]
    async fn test_null_args_and_custom_format() {
        let tool = CurrentTimeTool::new();
        assert!(tool.execute(Value::Null).await.unwrap().success);

        let result = tool
            .execute(serde_json::json!({"format": "%Y"}))
            .await
            .unwrap();
        assert_eq!(result.output.len(), 4);
    }

    #[tokio::test]
    async fn test_invalid_format_is_soft_failure() {
        let result = CurrentTimeTool::new()
            .execute(serde_json::json!({"format": "%Q"}))
            .await
            .unwrap();
        assert!(!result.success);
    }

    #[test]
    fn test_tool_id() {
        assert_eq!(CurrentTimeTool::new().id(), "get_current_time");
    }
}
