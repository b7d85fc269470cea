use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use memora_core::{AgentError, MemoryHit, MemoryRecord, MemoryStore, Result};

use crate::tokenize;

/// Process-local memory store with term-overlap relevance.
///
/// A record scores by the fraction of query terms it contains; records that
/// share no term with the query are not returned. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryMemoryStore {
    records: Arc<RwLock<Vec<MemoryRecord>>>,
}

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn score(query_terms: &HashSet<String>, content: &str) -> f32 {
        if query_terms.is_empty() {
            return 0.0;
        }
        let content_terms: HashSet<String> = tokenize(content).into_iter().collect();
        let matched = query_terms.intersection(&content_terms).count();
        matched as f32 / query_terms.len() as f32
    }
}

#[async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn add(&self, content: &str, user_id: &str) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.records
            .write()
            .push(MemoryRecord::new(id.clone(), user_id, content));
        debug!(memory_id = %id, user_id, "Memory added");
        Ok(id)
    }

    async fn search(&self, query: &str, user_id: &str, limit: usize) -> Result<Vec<MemoryHit>> {
        let query_terms: HashSet<String> = tokenize(query).into_iter().collect();
        let records = self.records.read();

        let mut hits: Vec<MemoryHit> = records
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| {
                let score = Self::score(&query_terms, &r.content);
                (score > 0.0).then(|| MemoryHit::new(r.clone(), score))
            })
            .collect();

        // stable: equal scores keep insertion order
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn get_all(&self, user_id: &str) -> Result<Vec<MemoryRecord>> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get(&self, memory_id: &str) -> Result<Option<MemoryRecord>> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|r| r.id == memory_id)
            .cloned())
    }

    async fn update(&self, memory_id: &str, content: &str) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|r| r.id == memory_id)
            .ok_or_else(|| AgentError::NotFound(memory_id.to_string()))?;
        record.content = content.to_string();
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, memory_id: &str) -> Result<()> {
        let mut records = self.records.write();
        let index = records
            .iter()
            .position(|r| r.id == memory_id)
            .ok_or_else(|| AgentError::NotFound(memory_id.to_string()))?;
        records.remove(index);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_and_get_all_scoped_by_user() {
        let store = InMemoryMemoryStore::new();
        store.add("likes tea", "alice").await.unwrap();
        store.add("likes coffee", "bob").await.unwrap();
        store.add("works remotely", "alice").await.unwrap();

        let alice = store.get_all("alice").await.unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].content, "likes tea");
        assert_eq!(alice[1].content, "works remotely");
        assert!(store.get_all("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_ranks_by_overlap() {
        let store = InMemoryMemoryStore::new();
        store.add("Project deadline is Friday", "u").await.unwrap();
        store
            .add("Project management sync moved to Monday", "u")
            .await
            .unwrap();
        store.add("Favourite colour is green", "u").await.unwrap();

        let hits = store.search("project management", "u", 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].record.content.contains("management"));
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_search_ties_keep_insertion_order() {
        let store = InMemoryMemoryStore::new();
        store.add("meeting at noon", "u").await.unwrap();
        store.add("meeting at three", "u").await.unwrap();

        let hits = store.search("meeting", "u", 5).await.unwrap();
        assert_eq!(hits[0].record.content, "meeting at noon");
        assert_eq!(hits[1].record.content, "meeting at three");
    }

    #[tokio::test]
    async fn test_search_respects_limit_and_user() {
        let store = InMemoryMemoryStore::new();
        for i in 0..4 {
            store.add(&format!("note {}", i), "u").await.unwrap();
        }
        store.add("note for someone else", "other").await.unwrap();

        assert_eq!(store.search("note", "u", 2).await.unwrap().len(), 2);
        assert!(store.search("note", "new-user", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_id() {
        let store = InMemoryMemoryStore::new();
        let id = store.add("old", "u").await.unwrap();

        store.update(&id, "new").await.unwrap();

        let record = store.get(&id).await.unwrap().unwrap();
        assert_eq!(record.content, "new");
        assert!(record.updated_at >= record.created_at);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let store = InMemoryMemoryStore::new();
        assert!(matches!(
            store.update("missing", "x").await,
            Err(AgentError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("missing").await,
            Err(AgentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = InMemoryMemoryStore::new();
        let id = store.add("temporary", "u").await.unwrap();
        store.delete(&id).await.unwrap();
        assert!(store.is_empty());
        assert!(store.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let store = InMemoryMemoryStore::new();
        let other = store.clone();
        store.add("shared", "u").await.unwrap();
        assert_eq!(other.len(), 1);
    }
}
