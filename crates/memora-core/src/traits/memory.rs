//! Memory store trait for user-scoped text records

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// User id used when a caller does not name one.
pub const DEFAULT_USER_ID: &str = "default_user";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemoryRecord {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            user_id: user_id.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A search result. Higher scores rank first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryHit {
    pub record: MemoryRecord,
    pub score: f32,
}

impl MemoryHit {
    pub fn new(record: MemoryRecord, score: f32) -> Self {
        Self { record, score }
    }
}

/// Semantic memory backend keyed by `user_id`.
///
/// Implementations report `AgentError::NotFound` for unknown ids on
/// `update`/`delete` and `AgentError::StoreUnavailable` when the backend
/// cannot be reached. Relevance scoring is the store's own business.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Persist `content` for `user_id` and return the new record id.
    async fn add(&self, content: &str, user_id: &str) -> Result<String>;

    async fn search(&self, query: &str, user_id: &str, limit: usize) -> Result<Vec<MemoryHit>>;

    async fn get_all(&self, user_id: &str) -> Result<Vec<MemoryRecord>>;

    async fn get(&self, memory_id: &str) -> Result<Option<MemoryRecord>>;

    async fn update(&self, memory_id: &str, content: &str) -> Result<()>;

    async fn delete(&self, memory_id: &str) -> Result<()>;

    fn backend_name(&self) -> &str;
}
