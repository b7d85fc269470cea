use async_trait::async_trait;
use std::sync::Arc;

use memora_core::Result;
use memora_llm::ModelRuntime;
use memora_tools::ToolRegistry;

use crate::predict::{ChainOfThought, Predict};
use crate::prediction::{Inputs, Prediction};
use crate::react::ReAct;
use crate::signature::Signature;
use crate::system::ReasoningSystem;

#[async_trait]
pub trait ReasoningStrategy: Send + Sync {
    async fn forward(&self, inputs: &Inputs) -> Result<Prediction>;

    fn name(&self) -> &str;

    fn signature(&self) -> &Signature;
}

/// Instantiate the strategy for `system`.
///
/// Only ReAct receives `tools` and `max_iters`; the single-call strategies
/// ignore both.
pub fn build_strategy(
    system: ReasoningSystem,
    signature: Arc<Signature>,
    runtime: ModelRuntime,
    tools: ToolRegistry,
    max_iters: usize,
) -> Box<dyn ReasoningStrategy> {
    match system {
        ReasoningSystem::React => Box::new(ReAct::new(signature, runtime, tools, max_iters)),
        ReasoningSystem::CoT => Box::new(ChainOfThought::new(signature, runtime)),
        ReasoningSystem::Basic => Box::new(Predict::new(signature, runtime)),
    }
}
