use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use memora_core::{AgentError, ExperimentTracker, ModelCard, ModelReference, Result};

pub(crate) const DEFAULT_MLFLOW_URI: &str = "http://localhost:5000";

/// Client for the MLflow tracking server REST API (`/api/2.0/mlflow`).
pub struct MlflowTracker {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl MlflowTracker {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/2.0/mlflow/{}", self.base_url, path)
    }

    async fn read_response(path: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::Tracking(format!("{}: {}", path, e)))?;

        if !status.is_success() {
            return Err(AgentError::Tracking(format!(
                "{} returned {}: {}",
                path, status, body
            )));
        }
        if body.trim().is_empty() {
            return Ok(json!({}));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(self.endpoint(path))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Tracking(format!("{}: {}", path, e)))?;
        Self::read_response(path, response).await
    }

    async fn experiment_by_name(&self, name: &str) -> Result<Option<String>> {
        let path = "experiments/get-by-name";
        let response = self
            .client
            .get(self.endpoint(path))
            .timeout(self.timeout)
            .query(&[("experiment_name", name)])
            .send()
            .await
            .map_err(|e| AgentError::Tracking(format!("{}: {}", path, e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = Self::read_response(path, response).await?;
        Ok(body["experiment"]["experiment_id"]
            .as_str()
            .map(str::to_string))
    }

    async fn record_run(&self, card: &ModelCard, run_id: &str) -> Result<()> {
        let params: Vec<Value> = card
            .params
            .iter()
            .map(|(key, value)| json!({ "key": key, "value": value }))
            .collect();
        self.post("runs/log-batch", json!({ "run_id": run_id, "params": params }))
            .await?;

        self.post(
            "runs/log-model",
            json!({ "run_id": run_id, "model_json": Self::model_json(card, run_id)? }),
        )
        .await?;
        Ok(())
    }

    /// Terminate a run with `FINISHED` or `FAILED`.
    async fn set_run_status(&self, run_id: &str, status: &str) -> Result<()> {
        self.post(
            "runs/update",
            json!({
                "run_id": run_id,
                "status": status,
                "end_time": Utc::now().timestamp_millis(),
            }),
        )
        .await?;
        Ok(())
    }

    fn model_json(card: &ModelCard, run_id: &str) -> Result<String> {
        let model = json!({
            "artifact_path": card.name,
            "run_id": run_id,
            "utc_time_created": Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            "flavors": { "memora": card },
        });
        Ok(serde_json::to_string(&model)?)
    }
}

#[async_trait]
impl ExperimentTracker for MlflowTracker {
    async fn ensure_experiment(&self, name: &str) -> Result<String> {
        if let Some(id) = self.experiment_by_name(name).await? {
            return Ok(id);
        }

        let body = self
            .post("experiments/create", json!({ "name": name }))
            .await?;
        let id = body["experiment_id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AgentError::Tracking("experiment id missing in response".into()))?;
        info!(experiment = name, experiment_id = %id, "Created MLflow experiment");
        Ok(id)
    }

    async fn log_model(
        &self,
        card: &ModelCard,
        run_name: Option<&str>,
        experiment_name: &str,
    ) -> Result<ModelReference> {
        let experiment_id = self.ensure_experiment(experiment_name).await?;

        let mut create = json!({
            "experiment_id": experiment_id,
            "start_time": Utc::now().timestamp_millis(),
        });
        if let Some(name) = run_name {
            create["run_name"] = json!(name);
        }
        let run = self.post("runs/create", create).await?;
        let run_id = run["run"]["info"]["run_id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AgentError::Tracking("run id missing in response".into()))?;

        if let Err(e) = self.record_run(card, &run_id).await {
            if let Err(update_err) = self.set_run_status(&run_id, "FAILED").await {
                warn!(%run_id, error = %update_err, "Could not mark MLflow run as failed");
            }
            return Err(e);
        }
        self.set_run_status(&run_id, "FINISHED").await?;

        debug!(%run_id, "Model logged to MLflow");
        Ok(ModelReference::new(experiment_id, run_id, card.name.clone()))
    }

    fn backend(&self) -> &str {
        "mlflow"
    }
}
