use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use memora_core::{AgentError, Result};

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap());

/// Find a JSON object in model output.
///
/// Accepts a bare object, one inside a fenced code block, or the outermost
/// `{...}` span of surrounding prose.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Some(map);
    }

    if let Some(caps) = FENCED_JSON.captures(trimmed) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&caps[1]) {
            return Some(map);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Render a JSON value as field text; strings lose their quotes.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Map model output onto `required` and `optional` output fields.
///
/// When no JSON object can be found and exactly one field is required, the
/// whole text becomes that field.
pub fn parse_outputs(
    text: &str,
    required: &[&str],
    optional: &[&str],
) -> Result<BTreeMap<String, String>> {
    let Some(map) = extract_json_object(text) else {
        if let [only] = required {
            let mut outputs = BTreeMap::new();
            outputs.insert(only.to_string(), text.trim().to_string());
            return Ok(outputs);
        }
        return Err(AgentError::Parse(format!(
            "expected a JSON object with keys {:?}",
            required
        )));
    };

    let mut outputs = BTreeMap::new();
    for field in required {
        let value = map
            .get(*field)
            .ok_or_else(|| AgentError::Parse(format!("missing output field `{}`", field)))?;
        outputs.insert(field.to_string(), value_to_text(value));
    }
    for field in optional {
        if let Some(value) = map.get(*field) {
            outputs.insert(field.to_string(), value_to_text(value));
        }
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object() {
        let map = extract_json_object(r#"{"response": "hi"}"#).unwrap();
        assert_eq!(map["response"], "hi");
    }

    #[test]
    fn test_fenced_block() {
        let text = "Here you go:\n```json\n{\"response\": \"fenced\"}\n```\nDone.";
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["response"], "fenced");
    }

    #[test]
    fn test_first_of_several_fenced_blocks() {
        let text = "```json\n{\"response\": \"one\"}\n```\nor\n```\n{\"response\": \"two\"}\n```";
        for _ in 0..2 {
            let map = extract_json_object(text).unwrap();
            assert_eq!(map["response"], "one");
        }
    }

    #[test]
    fn test_embedded_in_prose() {
        let text = r#"Sure. {"next_thought": "look it up", "next_tool_args": {"q": "x"}} Thanks"#;
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["next_thought"], "look it up");
        assert_eq!(map["next_tool_args"]["q"], "x");
    }

    #[test]
    fn test_no_object() {
        assert!(extract_json_object("plain answer").is_none());
        assert!(extract_json_object("} backwards {").is_none());
        assert!(extract_json_object("[1, 2]").is_none());
    }

    #[test]
    fn test_single_field_fallback() {
        let outputs = parse_outputs("  just text  ", &["response"], &[]).unwrap();
        assert_eq!(outputs["response"], "just text");
    }

    #[test]
    fn test_missing_fields() {
        assert!(matches!(
            parse_outputs("no json", &["a", "b"], &[]),
            Err(AgentError::Parse(_))
        ));
        assert!(matches!(
            parse_outputs(r#"{"a": "1"}"#, &["a", "b"], &[]),
            Err(AgentError::Parse(_))
        ));
    }

    #[test]
    fn test_optional_and_non_string_values() {
        let outputs = parse_outputs(
            r#"{"reasoning": "because", "count": 3}"#,
            &["count"],
            &["reasoning", "absent"],
        )
        .unwrap();
        assert_eq!(outputs["count"], "3");
        assert_eq!(outputs["reasoning"], "because");
        assert!(!outputs.contains_key("absent"));
    }
}
