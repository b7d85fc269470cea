//! Signatures and reasoning strategies for Memora

mod parse;
mod predict;
mod prediction;
mod prompt;
mod react;
mod signature;
mod strategy;
mod system;

pub use parse::{extract_json_object, parse_outputs};
pub use predict::{ChainOfThought, Predict};
pub use prediction::{Inputs, Prediction, TrajectoryStep};
pub use prompt::PromptRenderer;
pub use react::{FINISH_TOOL, ReAct};
pub use signature::{Field, Signature};
pub use strategy::{ReasoningStrategy, build_strategy};
pub use system::ReasoningSystem;
