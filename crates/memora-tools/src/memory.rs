use std::sync::Arc;

use tracing::debug;

use memora_core::{AgentError, DEFAULT_USER_ID, MemoryStore, MemoryRecord, Result, Tool};

use crate::builtin::{
    DeleteMemoryTool, GetAllMemoriesTool, SearchMemoriesTool, StoreMemoryTool, UpdateMemoryTool,
};

pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Text-returning facade over a [`MemoryStore`].
///
/// Every operation answers with a sentence a model can read back as an
/// observation. Operations that take an optional `user_id` fall back to the
/// configured default user.
#[derive(Clone)]
pub struct MemoryTools {
    store: Arc<dyn MemoryStore>,
    default_user: String,
}

impl MemoryTools {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self {
            store,
            default_user: DEFAULT_USER_ID.to_string(),
        }
    }

    pub fn with_default_user(mut self, user_id: impl Into<String>) -> Self {
        self.default_user = user_id.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn MemoryStore> {
        &self.store
    }

    pub fn default_user(&self) -> &str {
        &self.default_user
    }

    fn user<'a>(&'a self, user_id: Option<&'a str>) -> &'a str {
        user_id.unwrap_or(&self.default_user)
    }

    pub async fn store_memory(&self, content: &str, user_id: Option<&str>) -> Result<String> {
        if content.trim().is_empty() {
            return Err(AgentError::InvalidInput(
                "memory content must not be empty".to_string(),
            ));
        }

        let user_id = self.user(user_id);
        let memory_id = self.store.add(content, user_id).await?;
        debug!(%memory_id, user_id, "Stored memory");
        Ok(format!("Stored memory: {}", content))
    }

    pub async fn search_memories(
        &self,
        query: &str,
        user_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<String> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        if limit == 0 {
            return Err(AgentError::InvalidInput(
                "search limit must be positive".to_string(),
            ));
        }

        let user_id = self.user(user_id);
        let hits = self.store.search(query, user_id, limit).await?;
        debug!(user_id, hits = hits.len(), "Searched memories");

        if hits.is_empty() {
            return Ok("No relevant memories found.".to_string());
        }

        let records: Vec<&MemoryRecord> = hits.iter().map(|h| &h.record).collect();
        Ok(format!(
            "Relevant memories found:\n{}",
            numbered_lines(&records)
        ))
    }

    pub async fn get_all_memories(&self, user_id: Option<&str>) -> Result<String> {
        let records = self.store.get_all(self.user(user_id)).await?;
        if records.is_empty() {
            return Ok("No memories found for this user.".to_string());
        }

        let records: Vec<&MemoryRecord> = records.iter().collect();
        Ok(format!("All memories for user:\n{}", numbered_lines(&records)))
    }

    /// Replace a memory's content. The content is passed to the store as given.
    pub async fn update_memory(&self, memory_id: &str, new_content: &str) -> Result<String> {
        self.store.update(memory_id, new_content).await?;
        debug!(memory_id, "Updated memory");
        Ok(format!("Updated memory with new content: {}", new_content))
    }

    pub async fn delete_memory(&self, memory_id: &str) -> Result<String> {
        self.store.delete(memory_id).await?;
        debug!(memory_id, "Deleted memory");
        Ok("Memory deleted successfully.".to_string())
    }

    /// The five operations as tools, in the order store, search, get-all,
    /// update, delete.
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![
            Arc::new(StoreMemoryTool::new(self.clone())),
            Arc::new(SearchMemoriesTool::new(self.clone())),
            Arc::new(GetAllMemoriesTool::new(self.clone())),
            Arc::new(UpdateMemoryTool::new(self.clone())),
            Arc::new(DeleteMemoryTool::new(self.clone())),
        ]
    }
}

impl std::fmt::Debug for MemoryTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTools")
            .field("backend", &self.store.backend_name())
            .field("default_user", &self.default_user)
            .finish()
    }
}

fn numbered_lines(records: &[&MemoryRecord]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {} (id: {})\n", i + 1, r.content, r.id))
        .collect()
}
