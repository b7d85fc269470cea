use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Input field values keyed by field name.
pub type Inputs = BTreeMap<String, String>;

/// One executed ReAct step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryStep {
    pub thought: String,
    pub tool_name: String,
    pub tool_args: Value,
    pub observation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub outputs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trajectory: Vec<TrajectoryStep>,
}

impl Prediction {
    pub fn new(outputs: BTreeMap<String, String>) -> Self {
        Self {
            outputs,
            reasoning: None,
            trajectory: Vec::new(),
        }
    }

    pub fn with_reasoning(mut self, reasoning: Option<String>) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn with_trajectory(mut self, trajectory: Vec<TrajectoryStep>) -> Self {
        self.trajectory = trajectory;
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.outputs.get(field).map(String::as_str)
    }

    /// Names of the tools called, in call order.
    pub fn tool_calls(&self) -> Vec<&str> {
        self.trajectory
            .iter()
            .map(|s| s.tool_name.as_str())
            .collect()
    }
}
