//! Memory-aware agent and builder for Memora

mod agent;
mod builder;
mod config;
mod derived;

pub use agent::{AGENT_NAME, INPUT_EXAMPLE, MemoryAgent};
pub use builder::AgentBuilder;
pub use config::{AgentConfig, DEFAULT_MAX_ITERS, DEFAULT_MODEL};
pub use derived::{DEFAULT_PREFERENCE_CATEGORY, MemoryShortcuts};

pub use memora_core::{AgentInfo, Result};
pub use memora_reasoning::{Inputs, Prediction, ReasoningSystem, Signature};
