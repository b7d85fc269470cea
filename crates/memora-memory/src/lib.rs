//! Memory stores and memory engine configuration for Memora

mod config;
mod in_memory;
mod vector;

pub use config::{
    EmbedderSettings, GraphStoreSettings, LlmSettings, MemoryConfig, VectorStoreSettings,
};
pub use in_memory::InMemoryMemoryStore;
pub use memora_core::{DEFAULT_USER_ID, MemoryHit, MemoryRecord, MemoryStore};
pub use vector::{Embedder, HashEmbedder, VectorMemoryStore, VectorMetric};

/// Lowercased alphanumeric terms of `text`.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
