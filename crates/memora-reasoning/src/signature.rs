use serde::{Deserialize, Serialize};

use memora_core::{AgentError, Result};

use crate::prediction::Inputs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Declarative contract of a task: instructions, input fields and output
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub instructions: String,
    pub inputs: Vec<Field>,
    pub outputs: Vec<Field>,
}

impl Signature {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, field: Field) -> Self {
        self.inputs.push(field);
        self
    }

    pub fn with_output(mut self, field: Field) -> Self {
        self.outputs.push(field);
        self
    }

    /// The default agent contract: `user_input -> response`.
    pub fn memory_qa() -> Self {
        Self::new(
            "MemoryQA",
            "You're a helpful assistant and have access to memory method. \
             Whenever you answer a user's input, remember to store the information in memory \
             so that you can use it later.",
        )
        .with_input(Field::new("user_input"))
        .with_output(Field::new("response"))
    }

    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|f| f.name.as_str()).collect()
    }

    /// Copy with `field` placed before the existing outputs.
    pub fn prepend_output(&self, field: Field) -> Self {
        let mut signature = self.clone();
        signature.outputs.insert(0, field);
        signature
    }

    pub fn append_input(&self, field: Field) -> Self {
        let mut signature = self.clone();
        signature.inputs.push(field);
        signature
    }

    /// Every declared input must be present and non-blank.
    pub fn check_inputs(&self, inputs: &Inputs) -> Result<()> {
        for field in &self.inputs {
            match inputs.get(&field.name) {
                Some(value) if !value.trim().is_empty() => {}
                Some(_) => {
                    return Err(AgentError::InvalidInput(format!(
                        "input `{}` must not be empty",
                        field.name
                    )));
                }
                None => {
                    return Err(AgentError::InvalidInput(format!(
                        "missing input `{}`",
                        field.name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::memory_qa()
    }
}
