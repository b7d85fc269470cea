//! Prompt rendering for the reasoning strategies

use minijinja::{Environment, context};
use serde::Serialize;

use memora_core::{AgentError, Result};

use crate::prediction::{Inputs, TrajectoryStep};
use crate::signature::{Field, Signature};

const PREDICT_SYSTEM: &str = r#"{{ instructions }}

Your input fields are:
{% for f in inputs %}
{{ loop.index }}. `{{ f.name }}`{% if f.description %}: {{ f.description }}{% endif %}

{% endfor %}

Your output fields are:
{% for f in outputs %}
{{ loop.index }}. `{{ f.name }}`{% if f.description %}: {{ f.description }}{% endif %}

{% endfor %}

Respond with a single JSON object with exactly these keys: {{ output_keys }}."#;

const REACT_SYSTEM: &str = r#"{{ instructions }}

You are an Agent. In each episode, you will be given the fields {{ input_keys }} as input. And you can see your past trajectory so far.
Your goal is to use one or more of the supplied tools to collect any necessary information for producing {{ output_keys }}.

To do this, you will interleave next_thought, next_tool_name, and next_tool_args in each turn, and also when finishing the task.
After each tool call, you receive a resulting observation, which gets appended to your trajectory.

When writing next_thought, you may reason about the current situation and plan for future steps.
When selecting the next_tool_name and its next_tool_args, the tool must be one of:

{{ tools }}({{ finish_index }}) {{ finish }}: Marks the task as complete. That is, signals that all information for producing the outputs, i.e. {{ output_keys }}, are now available to be extracted. Arguments: {}

Respond with a single JSON object: {"next_thought": "...", "next_tool_name": "...", "next_tool_args": {...}}"#;

const INPUTS_USER: &str = r#"{% for f in fields %}
{{ f.name }}: {{ values[f.name] }}

{% endfor %}
{% if trajectory %}
trajectory:
{{ trajectory }}
{% endif %}"#;

#[derive(Serialize)]
struct FieldView<'a> {
    name: &'a str,
    description: &'a str,
}

fn field_views(fields: &[Field]) -> Vec<FieldView<'_>> {
    fields
        .iter()
        .map(|f| FieldView {
            name: &f.name,
            description: &f.description,
        })
        .collect()
}

fn key_list(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| format!("`{}`", f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders system and user prompts from a signature.
pub struct PromptRenderer {
    env: Environment<'static>,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        Self { env }
    }

    fn render(&self, template: &str, ctx: minijinja::Value) -> Result<String> {
        let tmpl = self
            .env
            .template_from_str(template)
            .map_err(|e| AgentError::Template(e.to_string()))?;
        tmpl.render(ctx)
            .map(|s| s.trim().to_string())
            .map_err(|e| AgentError::Template(e.to_string()))
    }

    pub fn predict_system(&self, signature: &Signature) -> Result<String> {
        self.render(
            PREDICT_SYSTEM,
            context! {
                instructions => &signature.instructions,
                inputs => field_views(&signature.inputs),
                outputs => field_views(&signature.outputs),
                output_keys => key_list(&signature.outputs),
            },
        )
    }

    pub fn react_system(
        &self,
        signature: &Signature,
        tools_listing: &str,
        tool_count: usize,
        finish: &str,
    ) -> Result<String> {
        self.render(
            REACT_SYSTEM,
            context! {
                instructions => &signature.instructions,
                input_keys => key_list(&signature.inputs),
                output_keys => key_list(&signature.outputs),
                tools => tools_listing,
                finish_index => tool_count + 1,
                finish => finish,
            },
        )
    }

    /// The user turn: one `name: value` line per input field, then the
    /// trajectory when there is one.
    pub fn user_inputs(
        &self,
        fields: &[Field],
        values: &Inputs,
        trajectory: &[TrajectoryStep],
    ) -> Result<String> {
        self.render(
            INPUTS_USER,
            context! {
                fields => field_views(fields),
                values => values,
                trajectory => format_trajectory(trajectory),
            },
        )
    }
}

/// Trajectory as numbered thought/action/observation lines.
pub(crate) fn format_trajectory(trajectory: &[TrajectoryStep]) -> String {
    let mut text = String::new();
    for (i, step) in trajectory.iter().enumerate() {
        text.push_str(&format!("Thought {}: {}\n", i + 1, step.thought));
        text.push_str(&format!(
            "Action {}: {} {}\n",
            i + 1,
            step.tool_name,
            step.tool_args
        ));
        text.push_str(&format!("Observation {}: {}\n", i + 1, step.observation));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_predict_system_lists_fields() {
        let prompt = PromptRenderer::new()
            .predict_system(&Signature::memory_qa())
            .unwrap();

        assert!(prompt.starts_with("You're a helpful assistant"));
        assert!(prompt.contains("1. `user_input`"));
        assert!(prompt.contains("1. `response`"));
        assert!(prompt.contains("exactly these keys: `response`."));
    }

    #[test]
    fn test_react_system_numbers_finish_after_tools() {
        let listing = "Available tools:\n(1) get_current_time: Get the current date and time. Arguments: {}\n";
        let prompt = PromptRenderer::new()
            .react_system(&Signature::memory_qa(), listing, 1, "finish")
            .unwrap();

        assert!(prompt.contains("(1) get_current_time"));
        assert!(prompt.contains("(2) finish: Marks the task as complete."));
        assert!(prompt.contains("next_tool_args"));
    }

    #[test]
    fn test_user_inputs_with_trajectory() {
        let mut values = Inputs::new();
        values.insert("user_input".into(), "What time is it?".into());
        let trajectory = vec![TrajectoryStep {
            thought: "check the clock".into(),
            tool_name: "get_current_time".into(),
            tool_args: json!({}),
            observation: "2025-01-01 09:00:00".into(),
        }];

        let prompt = PromptRenderer::new()
            .user_inputs(&Signature::memory_qa().inputs, &values, &trajectory)
            .unwrap();

        assert!(prompt.starts_with("user_input: What time is it?"));
        assert!(prompt.contains("Thought 1: check the clock"));
        assert!(prompt.contains("Action 1: get_current_time {}"));
        assert!(prompt.contains("Observation 1: 2025-01-01 09:00:00"));
    }

    #[test]
    fn test_user_inputs_without_trajectory() {
        let mut values = Inputs::new();
        values.insert("user_input".into(), "hello".into());
        let prompt = PromptRenderer::new()
            .user_inputs(&Signature::memory_qa().inputs, &values, &[])
            .unwrap();
        assert_eq!(prompt, "user_input: hello");
    }
}
