//! Embedding-backed memory store
//!
//! Records are embedded on write and ranked on search by the configured
//! similarity metric. The embedder is pluggable; [`HashEmbedder`] is a
//! deterministic bag-of-words embedder for offline use and tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use memora_core::{AgentError, MemoryHit, MemoryRecord, MemoryStore, Result};

use crate::config::MemoryConfig;
use crate::tokenize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorMetric {
    #[default]
    Cosine,
    Euclidean,
    #[serde(alias = "dot_product")]
    DotProduct,
}

impl VectorMetric {
    /// Similarity of two equal-length vectors; higher is closer.
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => {
                let norm_a = norm(a);
                let norm_b = norm(b);
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 0.0;
                }
                dot(a, b) / (norm_a * norm_b)
            }
            Self::Euclidean => {
                let distance: f32 = a
                    .iter()
                    .zip(b.iter())
                    .map(|(x, y)| (x - y).powi(2))
                    .sum::<f32>()
                    .sqrt();
                1.0 / (1.0 + distance)
            }
            Self::DotProduct => dot(a, b),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
            Self::DotProduct => "dotproduct",
        }
    }
}

impl FromStr for VectorMetric {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "euclidean" => Ok(Self::Euclidean),
            "dotproduct" | "dot_product" | "dot" => Ok(Self::DotProduct),
            other => Err(AgentError::Config(format!(
                "unsupported vector metric: {}",
                other
            ))),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn model_name(&self) -> &str;

    fn dimensions(&self) -> usize;
}

/// Hashes each term into one of `dimensions` buckets.
///
/// Texts sharing terms get overlapping vectors, so cosine ranking behaves
/// like term overlap. Not a semantic model.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, term: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        term.hash(&mut hasher);
        (hasher.finish() % self.dimensions as u64) as usize
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; self.dimensions];
        for term in tokenize(text) {
            vector[self.bucket(&term)] += 1.0;
        }
        Ok(vector)
    }

    fn model_name(&self) -> &str {
        "hash-embedding"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

struct StoredMemory {
    record: MemoryRecord,
    vector: Vec<f32>,
}

/// Memory store ranking records by embedding similarity.
///
/// Like a hosted vector index, search returns the `limit` nearest records of
/// the user regardless of absolute score.
#[derive(Clone)]
pub struct VectorMemoryStore {
    embedder: Arc<dyn Embedder>,
    metric: VectorMetric,
    collection: String,
    entries: Arc<RwLock<Vec<StoredMemory>>>,
}

impl VectorMemoryStore {
    pub fn new(embedder: Arc<dyn Embedder>, metric: VectorMetric) -> Self {
        Self {
            embedder,
            metric,
            collection: "memories".to_string(),
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Store honouring the configured collection, dimensions and metric, using
    /// a [`HashEmbedder`] of the configured width.
    pub fn from_config(config: &MemoryConfig) -> Self {
        let settings = &config.vector_store;
        Self::new(
            Arc::new(HashEmbedder::new(settings.embedding_model_dims)),
            settings.metric,
        )
        .with_collection(settings.collection_name.clone())
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn metric(&self) -> VectorMetric {
        self.metric
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    async fn embed_checked(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.embedder.embed(text).await?;
        if vector.len() != self.embedder.dimensions() {
            return Err(AgentError::StoreUnavailable(format!(
                "embedder {} returned {} dimensions, expected {}",
                self.embedder.model_name(),
                vector.len(),
                self.embedder.dimensions()
            )));
        }
        Ok(vector)
    }
}

#[async_trait]
impl MemoryStore for VectorMemoryStore {
    async fn add(&self, content: &str, user_id: &str) -> Result<String> {
        let vector = self.embed_checked(content).await?;
        let id = uuid::Uuid::new_v4().to_string();
        self.entries.write().push(StoredMemory {
            record: MemoryRecord::new(id.clone(), user_id, content),
            vector,
        });
        debug!(memory_id = %id, collection = %self.collection, "Memory embedded");
        Ok(id)
    }

    async fn search(&self, query: &str, user_id: &str, limit: usize) -> Result<Vec<MemoryHit>> {
        let query_vector = self.embed_checked(query).await?;
        let entries = self.entries.read();

        let mut hits: Vec<MemoryHit> = entries
            .iter()
            .filter(|e| e.record.user_id == user_id)
            .map(|e| {
                let score = self.metric.similarity(&query_vector, &e.vector);
                MemoryHit::new(e.record.clone(), score)
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn get_all(&self, user_id: &str) -> Result<Vec<MemoryRecord>> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| e.record.user_id == user_id)
            .map(|e| e.record.clone())
            .collect())
    }

    async fn get(&self, memory_id: &str) -> Result<Option<MemoryRecord>> {
        Ok(self
            .entries
            .read()
            .iter()
            .find(|e| e.record.id == memory_id)
            .map(|e| e.record.clone()))
    }

    async fn update(&self, memory_id: &str, content: &str) -> Result<()> {
        if !self.entries.read().iter().any(|e| e.record.id == memory_id) {
            return Err(AgentError::NotFound(memory_id.to_string()));
        }

        let vector = self.embed_checked(content).await?;
        let mut entries = self.entries.write();
        let entry = entries
            .iter_mut()
            .find(|e| e.record.id == memory_id)
            .ok_or_else(|| AgentError::NotFound(memory_id.to_string()))?;
        entry.record.content = content.to_string();
        entry.record.updated_at = Utc::now();
        entry.vector = vector;
        Ok(())
    }

    async fn delete(&self, memory_id: &str) -> Result<()> {
        let mut entries = self.entries.write();
        let index = entries
            .iter()
            .position(|e| e.record.id == memory_id)
            .ok_or_else(|| AgentError::NotFound(memory_id.to_string()))?;
        entries.remove(index);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "vector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_similarity() {
        let a = [1.0, 0.0, 0.0];
        let b = [0.0, 1.0, 0.0];

        assert!((VectorMetric::Cosine.similarity(&a, &a) - 1.0).abs() < 1e-6);
        assert!(VectorMetric::Cosine.similarity(&a, &b).abs() < 1e-6);
        assert!((VectorMetric::Euclidean.similarity(&a, &a) - 1.0).abs() < 1e-6);
        assert!(VectorMetric::Euclidean.similarity(&a, &b) < 1.0);
        assert_eq!(VectorMetric::DotProduct.similarity(&[2.0, 3.0], &[4.0, 5.0]), 23.0);
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("Cosine".parse::<VectorMetric>().unwrap(), VectorMetric::Cosine);
        assert_eq!(
            "dotproduct".parse::<VectorMetric>().unwrap(),
            VectorMetric::DotProduct
        );
        assert!(matches!(
            "manhattan".parse::<VectorMetric>(),
            Err(AgentError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new(64);
        let first = embedder.embed("Hello world").await.unwrap();
        let second = embedder.embed("hello, WORLD").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[tokio::test]
    async fn test_search_prefers_shared_terms() {
        let store = VectorMemoryStore::new(Arc::new(HashEmbedder::new(256)), VectorMetric::Cosine);
        store.add("User prefers dark roast coffee", "u").await.unwrap();
        store.add("Quarterly report due in March", "u").await.unwrap();

        let hits = store.search("coffee preference roast", "u", 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].record.content.contains("coffee"));
    }

    #[tokio::test]
    async fn test_update_reembeds() {
        let store = VectorMemoryStore::new(Arc::new(HashEmbedder::new(256)), VectorMetric::Cosine);
        let id = store.add("likes tea", "u").await.unwrap();
        store.add("enjoys hiking", "u").await.unwrap();

        store.update(&id, "likes mountains").await.unwrap();

        let hits = store.search("mountains", "u", 1).await.unwrap();
        assert_eq!(hits[0].record.id, id);
        assert!(matches!(
            store.update("missing", "x").await,
            Err(AgentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_from_config_uses_settings() {
        let config = MemoryConfig::from_lookup(|key| match key {
            "PINECONE_COLLECTION" => Some("agents".to_string()),
            "PINECONE_MODEL_DIM" => Some("32".to_string()),
            "PINECONE_METRIC" => Some("euclidean".to_string()),
            _ => None,
        })
        .unwrap();

        let store = VectorMemoryStore::from_config(&config);
        assert_eq!(store.collection(), "agents");
        assert_eq!(store.metric(), VectorMetric::Euclidean);

        store.add("something", "u").await.unwrap();
        store.delete(&store.get_all("u").await.unwrap()[0].id).await.unwrap();
        assert!(store.is_empty());
    }
}
