//! Memory operations exposed as tools

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use memora_core::{Result, Tool, ToolResult};

use super::{into_observation, parse_input};
use crate::generate_schema;
use crate::memory::MemoryTools;

macro_rules! parse_or_return {
    ($args:expr) => {
        match parse_input($args) {
            Ok(input) => input,
            Err(result) => return Ok(result),
        }
    };
}

#[derive(Debug, Deserialize, JsonSchema)]
struct StoreMemoryInput {
    /// Information to remember
    content: String,
    /// User the memory belongs to
    #[serde(default)]
    user_id: Option<String>,
}

pub struct StoreMemoryTool {
    memory: MemoryTools,
}

impl StoreMemoryTool {
    pub fn new(memory: MemoryTools) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for StoreMemoryTool {
    fn id(&self) -> &str {
        "store_memory"
    }

    fn name(&self) -> &str {
        "Store Memory"
    }

    fn description(&self) -> &str {
        "Store information in memory."
    }

    fn input_schema(&self) -> Value {
        generate_schema::<StoreMemoryInput>()
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let input: StoreMemoryInput = parse_or_return!(args);
        debug!(tool = self.id(), "Executing memory tool");
        into_observation(
            self.memory
                .store_memory(&input.content, input.user_id.as_deref())
                .await,
        )
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchMemoriesInput {
    /// What to look for
    query: String,
    /// User whose memories are searched
    #[serde(default)]
    user_id: Option<String>,
    /// Maximum number of results, defaults to 5
    #[serde(default)]
    limit: Option<usize>,
}

pub struct SearchMemoriesTool {
    memory: MemoryTools,
}

impl SearchMemoriesTool {
    pub fn new(memory: MemoryTools) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for SearchMemoriesTool {
    fn id(&self) -> &str {
        "search_memories"
    }

    fn name(&self) -> &str {
        "Search Memories"
    }

    fn description(&self) -> &str {
        "Search for relevant memories."
    }

    fn input_schema(&self) -> Value {
        generate_schema::<SearchMemoriesInput>()
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let input: SearchMemoriesInput = parse_or_return!(args);
        debug!(tool = self.id(), "Executing memory tool");
        into_observation(
            self.memory
                .search_memories(&input.query, input.user_id.as_deref(), input.limit)
                .await,
        )
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetAllMemoriesInput {
    /// User whose memories are listed
    #[serde(default)]
    user_id: Option<String>,
}

pub struct GetAllMemoriesTool {
    memory: MemoryTools,
}

impl GetAllMemoriesTool {
    pub fn new(memory: MemoryTools) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for GetAllMemoriesTool {
    fn id(&self) -> &str {
        "get_all_memories"
    }

    fn name(&self) -> &str {
        "Get All Memories"
    }

    fn description(&self) -> &str {
        "Get all memories for a user."
    }

    fn input_schema(&self) -> Value {
        generate_schema::<GetAllMemoriesInput>()
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let input: GetAllMemoriesInput = parse_or_return!(args);
        into_observation(self.memory.get_all_memories(input.user_id.as_deref()).await)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct UpdateMemoryInput {
    /// Id of the memory, as shown in search results
    memory_id: String,
    /// Replacement content
    new_content: String,
}

pub struct UpdateMemoryTool {
    memory: MemoryTools,
}

impl UpdateMemoryTool {
    pub fn new(memory: MemoryTools) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for UpdateMemoryTool {
    fn id(&self) -> &str {
        "update_memory"
    }

    fn name(&self) -> &str {
        "Update Memory"
    }

    fn description(&self) -> &str {
        "Update an existing memory."
    }

    fn input_schema(&self) -> Value {
        generate_schema::<UpdateMemoryInput>()
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let input: UpdateMemoryInput = parse_or_return!(args);
        into_observation(
            self.memory
                .update_memory(&input.memory_id, &input.new_content)
                .await,
        )
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DeleteMemoryInput {
    /// Id of the memory, as shown in search results
    memory_id: String,
}

pub struct DeleteMemoryTool {
    memory: MemoryTools,
}

impl DeleteMemoryTool {
    pub fn new(memory: MemoryTools) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for DeleteMemoryTool {
    fn id(&self) -> &str {
        "delete_memory"
    }

    fn name(&self) -> &str {
        "Delete Memory"
    }

    fn description(&self) -> &str {
        "Delete a specific memory."
    }

    fn input_schema(&self) -> Value {
        generate_schema::<DeleteMemoryInput>()
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let input: DeleteMemoryInput = parse_or_return!(args);
        into_observation(self.memory.delete_memory(&input.memory_id).await)
    }
}
