//! ReAct: interleaved thoughts and tool calls, then output extraction

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use memora_core::{ChatMessage, Result};
use memora_llm::ModelRuntime;
use memora_tools::ToolRegistry;

use crate::parse::{extract_json_object, value_to_text};
use crate::predict::ChainOfThought;
use crate::prediction::{Inputs, Prediction, TrajectoryStep};
use crate::prompt::PromptRenderer;
use crate::signature::Signature;
use crate::strategy::ReasoningStrategy;

/// Tool name that ends the loop.
pub const FINISH_TOOL: &str = "finish";

struct Step {
    thought: String,
    tool_name: String,
    tool_args: Value,
}

fn parse_step(text: &str) -> Option<Step> {
    let map = extract_json_object(text)?;
    let tool_name = map.get("next_tool_name")?.as_str()?.trim().to_string();
    if tool_name.is_empty() {
        return None;
    }

    let thought = map.get("next_thought").map(value_to_text).unwrap_or_default();
    let tool_args = match map.get("next_tool_args") {
        Some(Value::Object(args)) => Value::Object(args.clone()),
        // some models send the arguments as a JSON string
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(args)) => Value::Object(args),
            _ => Value::Object(Map::new()),
        },
        _ => Value::Object(Map::new()),
    };

    Some(Step {
        thought,
        tool_name,
        tool_args,
    })
}

pub struct ReAct {
    signature: Arc<Signature>,
    runtime: ModelRuntime,
    tools: ToolRegistry,
    max_iters: usize,
    renderer: PromptRenderer,
    extract: ChainOfThought,
}

impl ReAct {
    pub fn new(
        signature: Arc<Signature>,
        runtime: ModelRuntime,
        tools: ToolRegistry,
        max_iters: usize,
    ) -> Self {
        let extract = ChainOfThought::for_extraction(signature.clone(), runtime.clone());
        Self {
            signature,
            runtime,
            tools,
            max_iters,
            renderer: PromptRenderer::new(),
            extract,
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Run the named tool and return the observation text. Unknown tools and
    /// soft tool failures become observations; hard failures propagate.
    #[instrument(skip_all, fields(tool = %name))]
    async fn call_tool(&self, name: &str, args: Value) -> Result<String> {
        let Some(tool) = self.tools.get(name) else {
            warn!("Model selected an unknown tool");
            let mut available = self.tools.list_ids();
            available.push(FINISH_TOOL.to_string());
            return Ok(format!(
                "Error: unknown tool `{}`. Available tools: {}",
                name,
                available.join(", ")
            ));
        };

        info!(args = %args, "Executing tool");
        match tool.execute(args).await {
            Ok(result) => {
                debug!(success = result.success, output_len = result.output.len(), "Tool finished");
                Ok(result.observation())
            }
            Err(e) => {
                error!(error = %e, "Tool execution failed");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl ReasoningStrategy for ReAct {
    #[instrument(skip(self, inputs), fields(max_iters = self.max_iters))]
    async fn forward(&self, inputs: &Inputs) -> Result<Prediction> {
        self.signature.check_inputs(inputs)?;

        let system = self.renderer.react_system(
            &self.signature,
            &self.tools.generate_tools_prompt(),
            self.tools.len(),
            FINISH_TOOL,
        )?;
        let mut trajectory: Vec<TrajectoryStep> = Vec::new();
        let mut finished = false;

        for iteration in 1..=self.max_iters {
            let user = self
                .renderer
                .user_inputs(&self.signature.inputs, inputs, &trajectory)?;
            let response = self
                .runtime
                .complete(&[ChatMessage::system(&system), ChatMessage::user(user)])
                .await?;

            let Some(step) = parse_step(&response.content) else {
                warn!(iteration, "Ending the trajectory: no valid tool selection in model output");
                break;
            };
            debug!(iteration, tool = %step.tool_name, "ReAct step");

            if step.tool_name == FINISH_TOOL {
                trajectory.push(TrajectoryStep {
                    thought: step.thought,
                    tool_name: step.tool_name,
                    tool_args: step.tool_args,
                    observation: "Completed.".to_string(),
                });
                finished = true;
                break;
            }

            let observation = self.call_tool(&step.tool_name, step.tool_args.clone()).await?;
            trajectory.push(TrajectoryStep {
                thought: step.thought,
                tool_name: step.tool_name,
                tool_args: step.tool_args,
                observation,
            });
        }

        if !finished && trajectory.len() >= self.max_iters {
            info!(steps = trajectory.len(), "Iteration limit reached, extracting outputs");
        }

        let prediction = self.extract.predict(inputs, &trajectory).await?;
        Ok(prediction.with_trajectory(trajectory))
    }

    fn name(&self) -> &str {
        "react"
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }
}
