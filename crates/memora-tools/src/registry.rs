use std::collections::HashMap;
use std::sync::Arc;

use crate::{Tool, ToolError, ToolInfo};

/// Ordered set of tools keyed by id.
///
/// Iteration follows registration order, which is the order tools are
/// presented to the model.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `tools`, failing on the first duplicate id.
    pub fn from_tools<I>(tools: I) -> Result<Self, ToolError>
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let id = tool.id().to_string();
        if self.index.contains_key(&id) {
            return Err(ToolError::Duplicate(id));
        }

        self.index.insert(id, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(id).map(|&i| Arc::clone(&self.tools[i]))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.id().to_string()).collect()
    }

    pub fn list_infos(&self) -> Vec<ToolInfo> {
        self.tools.iter().map(|t| t.info()).collect()
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Numbered tool listing with argument schemas, in registration order.
    pub fn generate_tools_prompt(&self) -> String {
        if self.tools.is_empty() {
            return String::new();
        }

        let mut prompt = String::from("Available tools:\n");
        for (i, tool) in self.tools.iter().enumerate() {
            let schema = tool.input_schema();
            let args_desc = match schema.get("properties") {
                Some(props) => serde_json::to_string(props).unwrap_or_default(),
                None => "{}".to_string(),
            };

            prompt.push_str(&format!(
                "({}) {}: {} Arguments: {}\n",
                i + 1,
                tool.id(),
                tool.description(),
                args_desc
            ));
        }
        prompt
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolResult;
    use async_trait::async_trait;
    use serde_json::Value;

    struct TestTool {
        id: String,
    }

    fn test_tool(id: &str) -> Arc<dyn Tool> {
        Arc::new(TestTool { id: id.to_string() })
    }

    #[async_trait]
    impl Tool for TestTool {
        fn id(&self) -> &str {
            &self.id
        }
        fn name(&self) -> &str {
            "Test"
        }
        fn description(&self) -> &str {
            "A test tool."
        }
        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }
        async fn execute(&self, _args: Value) -> memora_core::Result<ToolResult> {
            Ok(ToolResult::ok("test"))
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ToolRegistry::new();
        registry.register(test_tool("test")).unwrap();

        assert!(registry.get("test").is_some());
        assert!(registry.contains("test"));
        assert!(registry.get("other").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = ToolRegistry::new();
        registry.register(test_tool("test")).unwrap();

        let err = registry.register(test_tool("test")).unwrap_err();
        assert!(matches!(err, ToolError::Duplicate(id) if id == "test"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_order_is_registration_order() {
        let registry =
            ToolRegistry::from_tools(["c", "a", "b"].into_iter().map(test_tool)).unwrap();
        assert_eq!(registry.list_ids(), vec!["c", "a", "b"]);
        assert_eq!(registry.get("a").unwrap().id(), "a");
    }

    #[test]
    fn test_from_tools_rejects_duplicates() {
        let result = ToolRegistry::from_tools(["a", "b", "a"].into_iter().map(test_tool));
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_tools_prompt() {
        assert!(ToolRegistry::new().generate_tools_prompt().is_empty());

        let registry = ToolRegistry::from_tools(["first", "second"].into_iter().map(test_tool))
            .unwrap();
        let prompt = registry.generate_tools_prompt();

        assert!(prompt.starts_with("Available tools:"));
        assert!(prompt.contains("(1) first: A test tool."));
        assert!(prompt.contains("(2) second:"));
        assert!(prompt.contains("\"text\""));
    }
}
