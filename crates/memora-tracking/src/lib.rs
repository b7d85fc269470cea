//! Experiment tracking backends for Memora
//!
//! [`LocalTracker`] keeps an MLflow-style run directory on disk;
//! [`MlflowTracker`] talks to an MLflow tracking server over REST. Both
//! implement [`ExperimentTracker`].

mod local;
mod mlflow;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub use local::LocalTracker;
pub use memora_core::{ExperimentTracker, ModelCard, ModelReference};
pub use mlflow::MlflowTracker;

pub const DEFAULT_EXPERIMENT: &str = "DSPy-Memory-Agent";
pub const DEFAULT_TRACKING_DIR: &str = "mlruns";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingBackend {
    #[default]
    Local,
    Mlflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default)]
    pub backend: TrackingBackend,

    /// Directory (optionally `file://`) for the local backend, server URL for MLflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_uri: Option<String>,

    #[serde(default = "default_experiment")]
    pub default_experiment: String,
}

fn default_experiment() -> String {
    DEFAULT_EXPERIMENT.to_string()
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            backend: TrackingBackend::Local,
            tracking_uri: None,
            default_experiment: default_experiment(),
        }
    }
}

impl TrackingConfig {
    /// Read `MLFLOW_TRACKING_URI`; an http(s) URI selects the MLflow backend.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(uri) = lookup("MLFLOW_TRACKING_URI").filter(|u| !u.trim().is_empty()) {
            if uri.starts_with("http://") || uri.starts_with("https://") {
                config.backend = TrackingBackend::Mlflow;
            }
            config.tracking_uri = Some(uri);
        }
        if let Some(name) = lookup("MLFLOW_EXPERIMENT_NAME").filter(|n| !n.trim().is_empty()) {
            config.default_experiment = name;
        }
        config
    }

    pub fn with_backend(mut self, backend: TrackingBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_tracking_uri(mut self, uri: impl Into<String>) -> Self {
        self.tracking_uri = Some(uri.into());
        self
    }

    /// Build the tracker without touching disk or network.
    pub fn build(&self) -> Arc<dyn ExperimentTracker> {
        match self.backend {
            TrackingBackend::Local => {
                let root = self
                    .tracking_uri
                    .as_deref()
                    .map(|uri| uri.strip_prefix("file://").unwrap_or(uri))
                    .unwrap_or(DEFAULT_TRACKING_DIR);
                Arc::new(LocalTracker::new(root))
            }
            TrackingBackend::Mlflow => Arc::new(MlflowTracker::new(
                self.tracking_uri
                    .as_deref()
                    .unwrap_or(mlflow::DEFAULT_MLFLOW_URI),
            )),
        }
    }
}

/// Prepare tracking and make sure the default experiment exists.
///
/// Best effort: failures are logged and yield `None`, the caller carries on
/// without tracking.
pub async fn setup_tracking(config: &TrackingConfig) -> Option<Arc<dyn ExperimentTracker>> {
    let tracker = config.build();
    match tracker.ensure_experiment(&config.default_experiment).await {
        Ok(experiment_id) => {
            info!(
                backend = tracker.backend(),
                experiment = %config.default_experiment,
                %experiment_id,
                "Tracking initialized"
            );
            Some(tracker)
        }
        Err(e) => {
            warn!(error = %e, "Tracking setup failed, continuing without tracking");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrackingConfig::default();
        assert_eq!(config.backend, TrackingBackend::Local);
        assert_eq!(config.default_experiment, "DSPy-Memory-Agent");
        assert_eq!(config.build().backend(), "local");
    }

    #[test]
    fn test_from_lookup_selects_backend() {
        let config = TrackingConfig::from_lookup(|key| match key {
            "MLFLOW_TRACKING_URI" => Some("http://localhost:5000".to_string()),
            _ => None,
        });
        assert_eq!(config.backend, TrackingBackend::Mlflow);
        assert_eq!(config.build().backend(), "mlflow");

        let config = TrackingConfig::from_lookup(|key| match key {
            "MLFLOW_TRACKING_URI" => Some("file:///tmp/runs".to_string()),
            "MLFLOW_EXPERIMENT_NAME" => Some("demo".to_string()),
            _ => None,
        });
        assert_eq!(config.backend, TrackingBackend::Local);
        assert_eq!(config.default_experiment, "demo");
    }

    #[test]
    fn test_yaml_config() {
        let config: TrackingConfig =
            serde_yaml::from_str("backend: mlflow\ntracking_uri: http://mlflow:5000\n").unwrap();
        assert_eq!(config.backend, TrackingBackend::Mlflow);
        assert_eq!(config.default_experiment, DEFAULT_EXPERIMENT);
    }

    #[tokio::test]
    async fn test_setup_local_creates_experiment() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = TrackingConfig::default()
            .with_tracking_uri(format!("file://{}", dir.path().join("mlruns").display()));

        let tracker = setup_tracking(&config).await;
        assert!(tracker.is_some());
        assert!(dir.path().join("mlruns").exists());
    }

    #[tokio::test]
    async fn test_setup_failure_is_swallowed() {
        let config = TrackingConfig::default()
            .with_backend(TrackingBackend::Mlflow)
            .with_tracking_uri("http://127.0.0.1:1");

        assert!(setup_tracking(&config).await.is_none());
    }
}
