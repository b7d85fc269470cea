//! Reminder and preference helpers composed from the memory operations

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use memora_core::{Result, Tool, ToolResult};
use memora_tools::builtin::{into_observation, parse_input};
use memora_tools::{MemoryTools, generate_schema};

const UNSPECIFIED_TIME: &str = "an unspecified time";
pub const DEFAULT_PREFERENCE_CATEGORY: &str = "general";

/// Fixed-template shortcuts over `store_memory` and `search_memories`.
#[derive(Debug, Clone)]
pub struct MemoryShortcuts {
    memory: MemoryTools,
}

impl MemoryShortcuts {
    pub fn new(memory: MemoryTools) -> Self {
        Self { memory }
    }

    pub fn memory(&self) -> &MemoryTools {
        &self.memory
    }

    pub async fn set_reminder(
        &self,
        reminder_text: &str,
        date_time: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<String> {
        let when = date_time
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(UNSPECIFIED_TIME);
        let reminder = format!("Reminder set for {}: {}", when, reminder_text);
        self.memory
            .store_memory(&format!("REMINDER: {}", reminder), user_id)
            .await
    }

    pub async fn get_preferences(
        &self,
        category: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<String> {
        let category = category.unwrap_or(DEFAULT_PREFERENCE_CATEGORY);
        let query = format!("user preferences {}", category);
        self.memory.search_memories(&query, user_id, None).await
    }

    pub async fn update_preferences(
        &self,
        category: &str,
        preference: &str,
        user_id: Option<&str>,
    ) -> Result<String> {
        let text = format!("User preference for {}: {}", category, preference);
        self.memory.store_memory(&text, user_id).await
    }

    /// `set_reminder`, `get_preferences` and `update_preferences` as tools.
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![
            Arc::new(SetReminderTool(self.clone())),
            Arc::new(GetPreferencesTool(self.clone())),
            Arc::new(UpdatePreferencesTool(self.clone())),
        ]
    }
}

macro_rules! parse_or_return {
    ($args:expr) => {
        match parse_input($args) {
            Ok(input) => input,
            Err(result) => return Ok(result),
        }
    };
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SetReminderInput {
    /// What to be reminded about
    reminder_text: String,
    /// When, in any human-readable form
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

struct SetReminderTool(MemoryShortcuts);

#[async_trait]
impl Tool for SetReminderTool {
    fn id(&self) -> &str {
        "set_reminder"
    }

    fn name(&self) -> &str {
        "Set Reminder"
    }

    fn description(&self) -> &str {
        "Set a reminder for the user."
    }

    fn input_schema(&self) -> Value {
        generate_schema::<SetReminderInput>()
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let input: SetReminderInput = parse_or_return!(args);
        into_observation(
            self.0
                .set_reminder(
                    &input.reminder_text,
                    input.date_time.as_deref(),
                    input.user_id.as_deref(),
                )
                .await,
        )
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetPreferencesInput {
    /// Preference category, defaults to 'general'
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

struct GetPreferencesTool(MemoryShortcuts);

#[async_trait]
impl Tool for GetPreferencesTool {
    fn id(&self) -> &str {
        "get_preferences"
    }

    fn name(&self) -> &str {
        "Get Preferences"
    }

    fn description(&self) -> &str {
        "Get user preferences for a specific category."
    }

    fn input_schema(&self) -> Value {
        generate_schema::<GetPreferencesInput>()
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let input: GetPreferencesInput = parse_or_return!(args);
        into_observation(
            self.0
                .get_preferences(input.category.as_deref(), input.user_id.as_deref())
                .await,
        )
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct UpdatePreferencesInput {
    category: String,
    preference: String,
    #[serde(default)]
    user_id: Option<String>,
}

struct UpdatePreferencesTool(MemoryShortcuts);

#[async_trait]
impl Tool for UpdatePreferencesTool {
    fn id(&self) -> &str {
        "update_preferences"
    }

    fn name(&self) -> &str {
        "Update Preferences"
    }

    fn description(&self) -> &str {
        "Update user preferences."
    }

    fn input_schema(&self) -> Value {
        generate_schema::<UpdatePreferencesInput>()
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let input: UpdatePreferencesInput = parse_or_return!(args);
        into_observation(
            self.0
                .update_preferences(
                    &input.category,
                    &input.preference,
                    input.user_id.as_deref(),
                )
                .await,
        )
    }
}
