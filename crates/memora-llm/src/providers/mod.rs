pub mod unified;

pub use unified::{ProviderBuilder, ProviderType, UnifiedLLMProvider, parse_model_string};
