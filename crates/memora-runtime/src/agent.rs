use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use memora_core::{AgentError, AgentInfo, ExperimentTracker, ModelCard, ModelReference, Result};
use memora_reasoning::{Inputs, Prediction, ReasoningStrategy, ReasoningSystem, Signature};
use memora_tools::{MemoryTools, ToolRegistry};

use crate::builder::AgentBuilder;
use crate::config::AgentConfig;
use crate::derived::MemoryShortcuts;

/// Artifact name the agent is logged under.
pub const AGENT_NAME: &str = "memory_react_agent";
pub const INPUT_EXAMPLE: &str = "What did we discuss about project management?";

/// An agent bound to one reasoning strategy and a fixed tool list.
///
/// Built through [`AgentBuilder`]; immutable afterwards. Build a new agent to
/// change the strategy or the tools.
pub struct MemoryAgent {
    info: AgentInfo,
    config: AgentConfig,
    signature: Arc<Signature>,
    tools: ToolRegistry,
    shortcuts: Option<MemoryShortcuts>,
    strategy: Box<dyn ReasoningStrategy>,
    tracker: Option<Arc<dyn ExperimentTracker>>,
}

impl MemoryAgent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    pub(crate) fn new(
        info: AgentInfo,
        config: AgentConfig,
        signature: Arc<Signature>,
        tools: ToolRegistry,
        shortcuts: Option<MemoryShortcuts>,
        strategy: Box<dyn ReasoningStrategy>,
        tracker: Option<Arc<dyn ExperimentTracker>>,
    ) -> Self {
        Self {
            info,
            config,
            signature,
            tools,
            shortcuts,
            strategy,
            tracker,
        }
    }

    pub async fn forward(&self, user_input: &str) -> Result<Prediction> {
        self.forward_with(user_input, Inputs::new()).await
    }

    /// Run the strategy with `user_input` plus any further signature inputs.
    #[instrument(skip_all, fields(reasoning = %self.config.reasoning_system))]
    pub async fn forward_with(&self, user_input: &str, mut inputs: Inputs) -> Result<Prediction> {
        if user_input.trim().is_empty() {
            return Err(AgentError::InvalidInput(
                "user input must not be empty".to_string(),
            ));
        }

        let field = self
            .signature
            .inputs
            .first()
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "user_input".to_string());
        inputs.insert(field, user_input.to_string());

        info!(strategy = self.strategy.name(), "Processing input");
        let prediction = self.strategy.forward(&inputs).await?;
        debug!(tool_calls = prediction.trajectory.len(), "Prediction ready");
        Ok(prediction)
    }

    fn shortcuts(&self) -> Result<&MemoryShortcuts> {
        self.shortcuts.as_ref().ok_or(AgentError::MemoryNotConfigured)
    }

    pub async fn set_reminder(
        &self,
        reminder_text: &str,
        date_time: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<String> {
        self.shortcuts()?
            .set_reminder(reminder_text, date_time, user_id)
            .await
    }

    pub async fn get_preferences(
        &self,
        category: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<String> {
        self.shortcuts()?.get_preferences(category, user_id).await
    }

    pub async fn update_preferences(
        &self,
        category: &str,
        preference: &str,
        user_id: Option<&str>,
    ) -> Result<String> {
        self.shortcuts()?
            .update_preferences(category, preference, user_id)
            .await
    }

    pub fn model_card(&self) -> ModelCard {
        let tool_names = self.tool_names();
        let mut card = ModelCard::new(AGENT_NAME, &self.config.model)
            .with_param("max_iters", self.config.max_iters)
            .with_param("num_tools", tool_names.len())
            .with_param(
                "tool_names",
                serde_json::to_string(&tool_names).unwrap_or_default(),
            );
        card.reasoning_system = self.config.reasoning_system.to_string();
        card.signature = serde_json::to_value(self.signature.as_ref()).unwrap_or_default();
        card.tool_names = tool_names;
        card.input_example = Some(INPUT_EXAMPLE.to_string());
        card
    }

    /// Log the agent as a model run.
    ///
    /// Requires `observability`. Tracker failures are logged and reported as
    /// `Ok(None)`. Without an explicit experiment the configured default is
    /// used.
    #[instrument(skip(self))]
    pub async fn log_to_mlflow(
        &self,
        run_name: Option<&str>,
        experiment_name: Option<&str>,
    ) -> Result<Option<ModelReference>> {
        if !self.config.observability {
            return Err(AgentError::ObservabilityDisabled);
        }

        let tracker = match &self.tracker {
            Some(tracker) => tracker.clone(),
            None => self.config.tracking.build(),
        };
        let experiment = experiment_name.unwrap_or(&self.config.tracking.default_experiment);

        match tracker.log_model(&self.model_card(), run_name, experiment).await {
            Ok(reference) => {
                info!(
                    backend = tracker.backend(),
                    model_uri = %reference.model_uri,
                    "Model logged"
                );
                Ok(Some(reference))
            }
            Err(e) => {
                warn!(backend = tracker.backend(), error = %e, "Failed to log model");
                Ok(None)
            }
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.list_ids()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn reasoning_system(&self) -> ReasoningSystem {
        self.config.reasoning_system
    }

    /// Memory operations, when the agent was built with a store.
    pub fn memory_tools(&self) -> Option<&MemoryTools> {
        self.shortcuts.as_ref().map(MemoryShortcuts::memory)
    }

    pub fn info(&self) -> AgentInfo {
        self.info.clone()
    }
}

impl std::fmt::Debug for MemoryAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAgent")
            .field("model", &self.config.model)
            .field("reasoning_system", &self.config.reasoning_system)
            .field("tools", &self.tools.list_ids())
            .field("memory", &self.shortcuts.is_some())
            .finish()
    }
}
