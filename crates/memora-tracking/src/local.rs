use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use memora_core::{AgentError, ExperimentTracker, ModelCard, ModelReference, Result};

#[derive(Debug, Serialize, Deserialize)]
struct ExperimentMeta {
    experiment_id: String,
    name: String,
    artifact_location: String,
    lifecycle_stage: String,
    creation_time: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct RunMeta {
    run_id: String,
    run_name: String,
    experiment_id: String,
    status: String,
    start_time: i64,
    end_time: i64,
    artifact_uri: String,
}

/// File-backed run store laid out like an MLflow `mlruns` directory:
///
/// ```text
/// <root>/<experiment_id>/meta.json
/// <root>/<experiment_id>/<run_id>/meta.json
/// <root>/<experiment_id>/<run_id>/params/<key>
/// <root>/<experiment_id>/<run_id>/artifacts/<model name>/MLmodel.json
/// ```
pub struct LocalTracker {
    root: PathBuf,
}

impl LocalTracker {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn find_experiment(&self, name: &str) -> Result<(Option<String>, u64)> {
        let mut max_id = 0u64;
        if !self.root.exists() {
            return Ok((None, max_id));
        }

        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let meta_path = entry.path().join("meta.json");
            if !meta_path.exists() {
                continue;
            }
            let meta: ExperimentMeta =
                serde_json::from_str(&tokio::fs::read_to_string(&meta_path).await?)?;
            if let Ok(id) = meta.experiment_id.parse::<u64>() {
                max_id = max_id.max(id);
            }
            if meta.name == name {
                return Ok((Some(meta.experiment_id), max_id));
            }
        }
        Ok((None, max_id))
    }
}

#[async_trait]
impl ExperimentTracker for LocalTracker {
    async fn ensure_experiment(&self, name: &str) -> Result<String> {
        let (existing, max_id) = self.find_experiment(name).await?;
        if let Some(id) = existing {
            return Ok(id);
        }

        let experiment_id = (max_id + 1).to_string();
        let dir = self.root.join(&experiment_id);
        tokio::fs::create_dir_all(&dir).await?;

        let meta = ExperimentMeta {
            experiment_id: experiment_id.clone(),
            name: name.to_string(),
            artifact_location: dir.display().to_string(),
            lifecycle_stage: "active".to_string(),
            creation_time: Utc::now().timestamp_millis(),
        };
        tokio::fs::write(dir.join("meta.json"), serde_json::to_string_pretty(&meta)?).await?;
        info!(experiment = name, %experiment_id, "Created experiment");
        Ok(experiment_id)
    }

    async fn log_model(
        &self,
        card: &ModelCard,
        run_name: Option<&str>,
        experiment_name: &str,
    ) -> Result<ModelReference> {
        if card.name.is_empty() || card.name.contains(['/', '\\']) {
            return Err(AgentError::Tracking(format!(
                "invalid artifact name: {:?}",
                card.name
            )));
        }

        let experiment_id = self.ensure_experiment(experiment_name).await?;
        let run_id = uuid::Uuid::new_v4().simple().to_string();
        let run_dir = self.root.join(&experiment_id).join(&run_id);
        let start_time = Utc::now().timestamp_millis();

        let params_dir = run_dir.join("params");
        tokio::fs::create_dir_all(&params_dir).await?;
        for (key, value) in &card.params {
            tokio::fs::write(params_dir.join(key), value).await?;
        }

        let artifact_dir = run_dir.join("artifacts").join(&card.name);
        tokio::fs::create_dir_all(&artifact_dir).await?;
        tokio::fs::write(
            artifact_dir.join("MLmodel.json"),
            serde_json::to_string_pretty(card)?,
        )
        .await?;

        let meta = RunMeta {
            run_id: run_id.clone(),
            run_name: run_name.unwrap_or(&run_id).to_string(),
            experiment_id: experiment_id.clone(),
            status: "FINISHED".to_string(),
            start_time,
            end_time: Utc::now().timestamp_millis(),
            artifact_uri: run_dir.join("artifacts").display().to_string(),
        };
        tokio::fs::write(run_dir.join("meta.json"), serde_json::to_string_pretty(&meta)?).await?;

        debug!(%run_id, params = card.params.len(), "Run written");
        Ok(ModelReference::new(experiment_id, run_id, card.name.clone()))
    }

    fn backend(&self) -> &str {
        "local"
    }
}
