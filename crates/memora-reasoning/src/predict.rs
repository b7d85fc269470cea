use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use memora_core::{ChatMessage, Result};
use memora_llm::ModelRuntime;

use crate::parse::parse_outputs;
use crate::prediction::{Inputs, Prediction, TrajectoryStep};
use crate::prompt::PromptRenderer;
use crate::signature::{Field, Signature};
use crate::strategy::ReasoningStrategy;

pub(crate) const REASONING_FIELD: &str = "reasoning";

/// One model call: system prompt from `prompt_signature`, user turn from
/// `input_fields` plus the trajectory.
pub(crate) async fn complete_signature(
    runtime: &ModelRuntime,
    renderer: &PromptRenderer,
    prompt_signature: &Signature,
    input_fields: &[Field],
    inputs: &Inputs,
    trajectory: &[TrajectoryStep],
) -> Result<String> {
    let messages = vec![
        ChatMessage::system(renderer.predict_system(prompt_signature)?),
        ChatMessage::user(renderer.user_inputs(input_fields, inputs, trajectory)?),
    ];
    let response = runtime.complete(&messages).await?;
    Ok(response.content)
}

/// Single call mapping inputs straight to outputs.
pub struct Predict {
    signature: Arc<Signature>,
    runtime: ModelRuntime,
    renderer: PromptRenderer,
}

impl Predict {
    pub fn new(signature: Arc<Signature>, runtime: ModelRuntime) -> Self {
        Self {
            signature,
            runtime,
            renderer: PromptRenderer::new(),
        }
    }
}

#[async_trait]
impl ReasoningStrategy for Predict {
    async fn forward(&self, inputs: &Inputs) -> Result<Prediction> {
        self.signature.check_inputs(inputs)?;

        let text = complete_signature(
            &self.runtime,
            &self.renderer,
            &self.signature,
            &self.signature.inputs,
            inputs,
            &[],
        )
        .await?;
        debug!(chars = text.len(), "Predict completed");

        let outputs = parse_outputs(&text, &self.signature.output_names(), &[])?;
        Ok(Prediction::new(outputs))
    }

    fn name(&self) -> &str {
        "predict"
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// Single call that writes out its reasoning before the outputs.
pub struct ChainOfThought {
    signature: Arc<Signature>,
    prompt_signature: Signature,
    runtime: ModelRuntime,
    renderer: PromptRenderer,
}

fn reasoning_field() -> Field {
    Field::new(REASONING_FIELD)
        .with_description("Think step by step in order to produce the outputs.")
}

impl ChainOfThought {
    pub fn new(signature: Arc<Signature>, runtime: ModelRuntime) -> Self {
        let prompt_signature = signature.prepend_output(reasoning_field());
        Self {
            signature,
            prompt_signature,
            runtime,
            renderer: PromptRenderer::new(),
        }
    }

    /// Variant that also reads a tool trajectory, used to extract final
    /// outputs after a ReAct loop.
    pub(crate) fn for_extraction(signature: Arc<Signature>, runtime: ModelRuntime) -> Self {
        let prompt_signature = signature
            .append_input(
                Field::new("trajectory")
                    .with_description("Tool calls and observations gathered so far."),
            )
            .prepend_output(reasoning_field());
        Self {
            signature,
            prompt_signature,
            runtime,
            renderer: PromptRenderer::new(),
        }
    }

    pub(crate) async fn predict(
        &self,
        inputs: &Inputs,
        trajectory: &[TrajectoryStep],
    ) -> Result<Prediction> {
        let text = complete_signature(
            &self.runtime,
            &self.renderer,
            &self.prompt_signature,
            &self.signature.inputs,
            inputs,
            trajectory,
        )
        .await?;

        let mut outputs =
            parse_outputs(&text, &self.signature.output_names(), &[REASONING_FIELD])?;
        let reasoning = outputs.remove(REASONING_FIELD);
        debug!(has_reasoning = reasoning.is_some(), "Chain of thought completed");
        Ok(Prediction::new(outputs).with_reasoning(reasoning))
    }
}

#[async_trait]
impl ReasoningStrategy for ChainOfThought {
    async fn forward(&self, inputs: &Inputs) -> Result<Prediction> {
        self.signature.check_inputs(inputs)?;
        self.predict(inputs, &[]).await
    }

    fn name(&self) -> &str {
        "chain_of_thought"
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }
}
