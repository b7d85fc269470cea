use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use memora_core::{
    AgentError, ExperimentTracker, MemoryStore, ModelCard, ModelReference, Result, Tool,
    ToolResult,
};
use memora_llm::MockLLMProvider;
use memora_memory::InMemoryMemoryStore;
use memora_runtime::{AgentBuilder, MemoryAgent, ReasoningSystem};
use memora_tracking::LocalTracker;

/// Valid as a ReAct `finish` step, a chain-of-thought answer and a plain prediction.
const UNIVERSAL_REPLY: &str = r#"{"next_thought": "done", "next_tool_name": "finish", "next_tool_args": {}, "reasoning": "Nothing to look up.", "response": "Hello there!"}"#;

struct NamedTool(&'static str);

#[async_trait]
impl Tool for NamedTool {
    fn id(&self) -> &str {
        self.0
    }
    fn name(&self) -> &str {
        self.0
    }
    fn description(&self) -> &str {
        "Test tool."
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object"})
    }
    async fn execute(&self, _args: Value) -> Result<ToolResult> {
        Ok(ToolResult::ok(format!("{} ran", self.0)))
    }
}

struct FailingTracker;

#[async_trait]
impl ExperimentTracker for FailingTracker {
    async fn ensure_experiment(&self, _name: &str) -> Result<String> {
        Err(AgentError::Tracking("server unreachable".into()))
    }

    async fn log_model(
        &self,
        _card: &ModelCard,
        _run_name: Option<&str>,
        _experiment_name: &str,
    ) -> Result<ModelReference> {
        Err(AgentError::Tracking("server unreachable".into()))
    }

    fn backend(&self) -> &str {
        "failing"
    }
}

fn agent_with(mock: &MockLLMProvider) -> AgentBuilder {
    MemoryAgent::builder().llm(Arc::new(mock.clone()))
}

fn store() -> Arc<dyn MemoryStore> {
    Arc::new(InMemoryMemoryStore::new())
}

#[tokio::test]
async fn test_every_reasoning_tag_builds_and_answers() {
    for tag in ["react", "ReAct", "cot", "CoT", "basic", "BASIC"] {
        let mock = MockLLMProvider::with_responses([UNIVERSAL_REPLY]);
        let agent = agent_with(&mock)
            .reasoning_system(tag)
            .memory(store())
            .build()
            .unwrap();

        let prediction = agent.forward("Hi!").await.unwrap();
        assert_eq!(prediction.get("response"), Some("Hello there!"), "tag {}", tag);
    }
}

#[tokio::test]
async fn test_strategy_follows_tag() {
    let mock = MockLLMProvider::with_responses([UNIVERSAL_REPLY]);

    let cot = agent_with(&mock).reasoning_system("cot").build().unwrap();
    assert_eq!(cot.reasoning_system(), ReasoningSystem::CoT);
    let prediction = cot.forward("Hi!").await.unwrap();
    assert_eq!(prediction.reasoning.as_deref(), Some("Nothing to look up."));
    assert!(prediction.trajectory.is_empty());

    let basic = agent_with(&mock).reasoning(ReasoningSystem::Basic).build().unwrap();
    let prediction = basic.forward("Hi!").await.unwrap();
    assert!(prediction.reasoning.is_none());
}

#[test]
fn test_unknown_reasoning_tag_is_rejected() {
    let mock = MockLLMProvider::new();
    for tag in ["tree_of_thought", "predict", "chain_of_thought", " react ", "react\n"] {
        let err = agent_with(&mock).reasoning_system(tag).build().unwrap_err();

        match err {
            AgentError::UnsupportedReasoningSystem(rejected) => assert_eq!(rejected, tag),
            other => panic!("unexpected error for {tag:?}: {other}"),
        }
    }
}

#[test]
fn test_zero_max_iters_is_rejected() {
    let mock = MockLLMProvider::new();
    let err = agent_with(&mock).max_iters(0).build().unwrap_err();
    assert!(matches!(err, AgentError::Config(_)));
}

#[tokio::test]
async fn test_blank_input_is_rejected() {
    let mock = MockLLMProvider::new();
    let agent = agent_with(&mock).build().unwrap();

    let err = agent.forward("   ").await.unwrap_err();
    assert!(matches!(err, AgentError::InvalidInput(_)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_memory_helpers_require_memory() {
    let mock = MockLLMProvider::new();
    let agent = agent_with(&mock).build().unwrap();

    assert!(matches!(
        agent.set_reminder("stand-up", Some("9am"), None).await,
        Err(AgentError::MemoryNotConfigured)
    ));
    assert!(matches!(
        agent.get_preferences(None, None).await,
        Err(AgentError::MemoryNotConfigured)
    ));
    assert!(matches!(
        agent.update_preferences("food", "spicy", None).await,
        Err(AgentError::MemoryNotConfigured)
    ));
    assert!(agent.memory_tools().is_none());
}

#[tokio::test]
async fn test_memory_helpers_with_store() {
    let mock = MockLLMProvider::new();
    let agent = agent_with(&mock).memory(store()).build().unwrap();

    agent
        .update_preferences("food", "vegetarian", None)
        .await
        .unwrap();
    agent
        .set_reminder("renew passport", Some("2026-11-01"), None)
        .await
        .unwrap();

    let prefs = agent.get_preferences(Some("food"), None).await.unwrap();
    assert!(prefs.contains("User preference for food: vegetarian"));

    let all = agent
        .memory_tools()
        .unwrap()
        .get_all_memories(Some("default_user"))
        .await
        .unwrap();
    assert!(all.contains("REMINDER: Reminder set for 2026-11-01: renew passport"));
}

#[tokio::test]
async fn test_store_then_search_and_list() {
    let mock = MockLLMProvider::new();
    let agent = agent_with(&mock).memory(store()).build().unwrap();
    let memory = agent.memory_tools().unwrap();

    memory
        .store_memory("Project kickoff is on Monday", Some("u"))
        .await
        .unwrap();

    let found = memory
        .search_memories("project kickoff", Some("u"), None)
        .await
        .unwrap();
    assert!(found.contains("Project kickoff is on Monday"));

    let all = memory.get_all_memories(Some("u")).await.unwrap();
    assert!(all.contains("Project kickoff is on Monday"));

    let nothing = memory
        .search_memories("project kickoff", Some("new-user"), None)
        .await
        .unwrap();
    assert_eq!(nothing, "No relevant memories found.");
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let mock = MockLLMProvider::new();
    let agent = agent_with(&mock).memory(store()).build().unwrap();
    let memory = agent.memory_tools().unwrap();

    assert!(matches!(
        memory.update_memory("no-such-id", "new").await,
        Err(AgentError::NotFound(_))
    ));
    assert!(matches!(
        memory.delete_memory("no-such-id").await,
        Err(AgentError::NotFound(_))
    ));
}

#[test]
fn test_tool_list_without_memory() {
    let mock = MockLLMProvider::new();
    let agent = agent_with(&mock)
        .tool(Arc::new(NamedTool("f")))
        .tool(Arc::new(NamedTool("g")))
        .build()
        .unwrap();

    assert_eq!(agent.tool_names(), vec!["get_current_time", "f", "g"]);
}

#[test]
fn test_tool_list_with_memory() {
    let mock = MockLLMProvider::new();
    let agent = agent_with(&mock).memory(store()).build().unwrap();

    assert_eq!(
        agent.tool_names(),
        vec![
            "get_current_time",
            "store_memory",
            "search_memories",
            "get_all_memories",
            "update_memory",
            "delete_memory",
            "set_reminder",
            "get_preferences",
            "update_preferences",
        ]
    );
}

#[test]
fn test_duplicate_tool_id_is_rejected() {
    let mock = MockLLMProvider::new();
    let err = agent_with(&mock)
        .memory(store())
        .tool(Arc::new(NamedTool("store_memory")))
        .build()
        .unwrap_err();
    assert!(matches!(err, AgentError::Tool(_)));
}

#[tokio::test]
async fn test_logging_requires_observability() {
    let mock = MockLLMProvider::new();
    let agent = agent_with(&mock).build().unwrap();

    assert!(matches!(
        agent.log_to_mlflow(None, None).await,
        Err(AgentError::ObservabilityDisabled)
    ));
}

#[tokio::test]
async fn test_tracker_failure_yields_none() {
    let mock = MockLLMProvider::new();
    let agent = agent_with(&mock)
        .observability(true)
        .tracker(Arc::new(FailingTracker))
        .build()
        .unwrap();

    let reference = agent.log_to_mlflow(Some("run"), Some("exp")).await.unwrap();
    assert!(reference.is_none());
}

#[tokio::test]
async fn test_log_to_local_tracker() {
    let dir = tempfile::TempDir::new().unwrap();
    let mock = MockLLMProvider::new();
    let agent = agent_with(&mock)
        .memory(store())
        .observability(true)
        .tracker(Arc::new(LocalTracker::new(dir.path())))
        .build()
        .unwrap();

    let reference = agent
        .log_to_mlflow(Some("nightly"), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reference.artifact_path, "memory_react_agent");
    assert!(reference.model_uri.starts_with("runs:/"));

    let params = dir
        .path()
        .join(&reference.experiment_id)
        .join(&reference.run_id)
        .join("params");
    assert_eq!(std::fs::read_to_string(params.join("num_tools")).unwrap(), "9");
    assert_eq!(std::fs::read_to_string(params.join("max_iters")).unwrap(), "6");
    assert!(
        std::fs::read_to_string(params.join("tool_names"))
            .unwrap()
            .contains("\"update_preferences\"")
    );
}

#[tokio::test]
async fn test_react_feeds_observations_and_stops_at_max_iters() {
    let step = r#"{"next_thought": "remember", "next_tool_name": "store_memory", "next_tool_args": {"content": "User likes tea"}}"#;
    let mock = MockLLMProvider::with_responses([
        step,
        step,
        r#"{"reasoning": "Stored twice.", "response": "Noted, you like tea."}"#,
    ]);
    let agent = agent_with(&mock)
        .memory(store())
        .max_iters(2)
        .build()
        .unwrap();

    let prediction = agent.forward("I like tea").await.unwrap();

    assert_eq!(prediction.get("response"), Some("Noted, you like tea."));
    assert_eq!(prediction.tool_calls(), vec!["store_memory", "store_memory"]);
    assert_eq!(mock.call_count(), 3);

    let second_step = &mock.call_history()[1];
    assert!(second_step.messages[1]
        .content
        .contains("Stored memory: User likes tea"));
}

#[tokio::test]
async fn test_agent_info_and_card() {
    let mock = MockLLMProvider::new();
    let agent = agent_with(&mock)
        .model("anthropic/claude-3-5-haiku-latest")
        .memory(store())
        .build()
        .unwrap();

    let info = agent.info();
    assert_eq!(info.id, "memory_react_agent");
    assert!(info.capabilities.contains(&"react".to_string()));

    let card = agent.model_card();
    assert_eq!(card.model, "anthropic/claude-3-5-haiku-latest");
    assert_eq!(card.reasoning_system, "react");
    assert_eq!(card.tool_names.len(), 9);
    assert_eq!(
        card.input_example.as_deref(),
        Some("What did we discuss about project management?")
    );
    assert_eq!(card.signature["name"], "MemoryQA");
}

#[test]
fn test_builder_from_yaml() {
    let mock = MockLLMProvider::new();
    let agent = AgentBuilder::from_yaml("reasoning_system: basic\nmax_iters: 2\n")
        .unwrap()
        .llm(Arc::new(mock))
        .build()
        .unwrap();

    assert_eq!(agent.reasoning_system(), ReasoningSystem::Basic);
    assert_eq!(agent.config().max_iters, 2);
    assert_eq!(agent.tool_names(), vec!["get_current_time"]);
}
