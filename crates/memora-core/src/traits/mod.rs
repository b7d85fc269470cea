//! Collaborator traits: LLM providers, tools, memory stores and trackers

pub mod llm;
pub mod memory;
pub mod tool;
pub mod tracker;

pub use llm::LLMProvider;
pub use memory::MemoryStore;
pub use tool::Tool;
pub use tracker::ExperimentTracker;
