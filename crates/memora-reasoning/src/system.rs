use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use memora_core::AgentError;

/// Strategy an agent reasons with.
///
/// Parsed case-insensitively from exactly `react`, `cot` or `basic`;
/// anything else, surrounding whitespace included, is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReasoningSystem {
    #[default]
    React,
    CoT,
    Basic,
}

impl ReasoningSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::React => "react",
            Self::CoT => "cot",
            Self::Basic => "basic",
        }
    }

    /// Only ReAct calls tools.
    pub fn uses_tools(&self) -> bool {
        matches!(self, Self::React)
    }

    pub fn uses_iteration(&self) -> bool {
        matches!(self, Self::React)
    }
}

impl FromStr for ReasoningSystem {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::React, Self::CoT, Self::Basic]
            .into_iter()
            .find(|system| system.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AgentError::UnsupportedReasoningSystem(s.to_string()))
    }
}

impl TryFrom<String> for ReasoningSystem {
    type Error = AgentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReasoningSystem> for String {
    fn from(value: ReasoningSystem) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ReasoningSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
