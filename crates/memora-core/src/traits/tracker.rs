//! Experiment tracking sink

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::Result;

/// Serializable description of an agent, logged as a model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCard {
    /// Artifact path the model is stored under inside the run.
    pub name: String,
    pub model: String,
    pub reasoning_system: String,
    pub signature: Value,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub tool_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_example: Option<String>,
}

impl ModelCard {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            reasoning_system: String::new(),
            signature: Value::Null,
            params: BTreeMap::new(),
            tool_names: Vec::new(),
            input_example: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }
}

/// Location of a logged model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelReference {
    pub experiment_id: String,
    pub run_id: String,
    pub artifact_path: String,
    pub model_uri: String,
}

impl ModelReference {
    pub fn new(
        experiment_id: impl Into<String>,
        run_id: impl Into<String>,
        artifact_path: impl Into<String>,
    ) -> Self {
        let run_id = run_id.into();
        let artifact_path = artifact_path.into();
        Self {
            experiment_id: experiment_id.into(),
            model_uri: format!("runs:/{}/{}", run_id, artifact_path),
            run_id,
            artifact_path,
        }
    }
}

#[async_trait]
pub trait ExperimentTracker: Send + Sync {
    /// Id of the experiment called `name`, created if missing.
    async fn ensure_experiment(&self, name: &str) -> Result<String>;

    /// Log `card` as a model in a new run of `experiment_name`, creating the
    /// experiment when it does not exist yet.
    async fn log_model(
        &self,
        card: &ModelCard,
        run_name: Option<&str>,
        experiment_name: &str,
    ) -> Result<ModelReference>;

    fn backend(&self) -> &str;
}
