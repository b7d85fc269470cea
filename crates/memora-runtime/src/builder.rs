use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use memora_core::{
    AgentError, AgentInfo, ExperimentTracker, LLMConfig, LLMProvider, MemoryStore, Result, Tool,
};
use memora_llm::ModelRuntime;
use memora_reasoning::{ReasoningSystem, Signature, build_strategy};
use memora_tools::{CurrentTimeTool, MemoryTools, ToolRegistry};
use memora_tracking::TrackingConfig;

use crate::agent::{AGENT_NAME, MemoryAgent};
use crate::config::AgentConfig;
use crate::derived::MemoryShortcuts;

pub struct AgentBuilder {
    config: AgentConfig,
    reasoning_system: Option<String>,
    memory: Option<Arc<dyn MemoryStore>>,
    tools: Vec<Arc<dyn Tool>>,
    signature: Option<Signature>,
    llm: Option<Arc<dyn LLMProvider>>,
    runtime: Option<ModelRuntime>,
    tracker: Option<Arc<dyn ExperimentTracker>>,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::from_config(AgentConfig::default())
    }

    pub fn from_config(config: AgentConfig) -> Self {
        Self {
            config,
            reasoning_system: None,
            memory: None,
            tools: Vec::new(),
            signature: None,
            llm: None,
            runtime: None,
            tracker: None,
        }
    }

    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        Ok(Self::from_config(AgentConfig::from_yaml(yaml_content)?))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_config(AgentConfig::from_yaml_file(path)?))
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Strategy tag, checked at `build`: `react`, `cot` or `basic` in any case.
    pub fn reasoning_system(mut self, system: impl Into<String>) -> Self {
        self.reasoning_system = Some(system.into());
        self
    }

    pub fn reasoning(mut self, system: ReasoningSystem) -> Self {
        self.config.reasoning_system = system;
        self.reasoning_system = None;
        self
    }

    pub fn max_iters(mut self, max_iters: usize) -> Self {
        self.config.max_iters = max_iters;
        self
    }

    pub fn observability(mut self, enabled: bool) -> Self {
        self.config.observability = enabled;
        self
    }

    pub fn default_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.config.default_user_id = user_id.into();
        self
    }

    pub fn llm_config(mut self, config: LLMConfig) -> Self {
        self.config.llm = config;
        self
    }

    pub fn tracking(mut self, tracking: TrackingConfig) -> Self {
        self.config.tracking = tracking;
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.extra.insert(key.into(), value);
        self
    }

    pub fn memory(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Provider to use with the configured `llm` sampling parameters.
    pub fn llm(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.llm = Some(provider);
        self
    }

    /// Fully configured model handle; takes precedence over `llm` and `model`.
    pub fn runtime(mut self, runtime: ModelRuntime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn tracker(mut self, tracker: Arc<dyn ExperimentTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn build(self) -> Result<MemoryAgent> {
        let mut config = self.config;
        if let Some(system) = self.reasoning_system {
            config.reasoning_system = system.parse()?;
        }
        config.validate()?;

        let shortcuts = self.memory.map(|store| {
            MemoryShortcuts::new(
                MemoryTools::new(store).with_default_user(config.default_user_id.clone()),
            )
        });

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(CurrentTimeTool::new()))?;
        if let Some(shortcuts) = &shortcuts {
            for tool in shortcuts.memory().tools() {
                tools.register(tool)?;
            }
            for tool in shortcuts.tools() {
                tools.register(tool)?;
            }
        }
        for tool in self.tools {
            tools.register(tool)?;
        }

        let runtime = match (self.runtime, self.llm) {
            (Some(runtime), _) => runtime,
            (None, Some(provider)) => ModelRuntime::new(provider).with_config(config.llm.clone()),
            (None, None) => ModelRuntime::from_model(&config.model, config.llm.clone())
                .map_err(|e| AgentError::Config(format!("model `{}`: {}", config.model, e)))?,
        };
        debug!(provider = runtime.provider_name(), "Model runtime ready");

        let signature = Arc::new(self.signature.unwrap_or_default());
        let strategy = build_strategy(
            config.reasoning_system,
            signature.clone(),
            runtime,
            tools.clone(),
            config.max_iters,
        );

        let info = AgentInfo::new(AGENT_NAME, "Memory Agent", env!("CARGO_PKG_VERSION"))
            .with_description(signature.instructions.clone())
            .with_capability(config.reasoning_system.as_str());

        info!(
            model = %config.model,
            reasoning = %config.reasoning_system,
            tools = tools.len(),
            memory = shortcuts.is_some(),
            "Agent built"
        );

        Ok(MemoryAgent::new(
            info,
            config,
            signature,
            tools,
            shortcuts,
            strategy,
            self.tracker,
        ))
    }
}
