//! Memory engine configuration
//!
//! Built from key/value lookups (normally the process environment) with the
//! defaults below. `graph_*` constructors add a Neo4j graph store section.

use serde::{Deserialize, Serialize};

use memora_core::{AgentError, Result};

use crate::vector::VectorMetric;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedderSettings {
    pub provider: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreSettings {
    pub provider: String,
    pub collection_name: String,
    pub embedding_model_dims: usize,
    pub cloud: String,
    pub region: String,
    pub metric: VectorMetric,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStoreSettings {
    pub provider: String,
    pub url: String,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl std::fmt::Debug for GraphStoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStoreSettings")
            .field("provider", &self.provider)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub llm: LlmSettings,
    pub embedder: EmbedderSettings,
    pub vector_store: VectorStoreSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_store: Option<GraphStoreSettings>,
}

impl MemoryConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn graph_from_env() -> Result<Self> {
        Self::graph_from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let dims_raw = get("PINECONE_MODEL_DIM", "1536");
        let embedding_model_dims: usize = dims_raw.trim().parse().map_err(|_| {
            AgentError::Config(format!("PINECONE_MODEL_DIM is not a number: {}", dims_raw))
        })?;
        if embedding_model_dims == 0 {
            return Err(AgentError::Config(
                "PINECONE_MODEL_DIM must be positive".to_string(),
            ));
        }

        Ok(Self {
            llm: LlmSettings {
                provider: "openai".to_string(),
                model: get("OPENAI_SMALL_MODEL", "gpt-4o-mini"),
                temperature: 0.1,
            },
            embedder: EmbedderSettings {
                provider: "openai".to_string(),
                model: get("OPENAI_EMBEDDING_MODEL", "text-embedding-3-small"),
            },
            vector_store: VectorStoreSettings {
                provider: "pinecone".to_string(),
                collection_name: get("PINECONE_COLLECTION", "testing"),
                embedding_model_dims,
                cloud: get("PINECONE_CLOUD", "aws"),
                region: get("PINECONE_REGION", "us-east-1"),
                metric: get("PINECONE_METRIC", "cosine").parse()?,
            },
            graph_store: None,
        })
    }

    pub fn graph_from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::from_lookup(&lookup)?;
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        config.graph_store = Some(GraphStoreSettings {
            provider: "neo4j".to_string(),
            url: get("NEO4J_URL", "bolt://localhost:7687"),
            username: get("NEO4J_USERNAME", "neo4j"),
            password: get("NEO4J_PASSWORD", "password"),
            database: get("NEO4J_DATABASE", "neo4j"),
        });
        Ok(config)
    }
}
