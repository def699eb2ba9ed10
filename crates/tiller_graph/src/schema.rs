//! The decision-record wire shape the model must emit.
//!
//! One JSON object with four logical fields. Exactly one of `tool_name` and
//! `final_answer` must be non-null; `reasoning` is advisory and never drives
//! control flow.

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionRecord {
    /// Tool to call, or null when answering directly.
    #[serde(default)]
    pub tool_name: Option<String>,
    /// Flat mapping of argument name to value. Null and absent both mean "no
    /// arguments".
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
    /// Free-text decision rationale, informational only.
    #[serde(default)]
    pub reasoning: String,
    /// Final answer, or null when a tool call is needed.
    #[serde(default)]
    pub final_answer: Option<String>,
}

/// Output-format instructions embedded verbatim in every decision prompt.
pub fn format_instructions() -> &'static str {
    r#"Respond with a single JSON object and nothing else, using exactly these four fields:

{
  "tool_name": "name of the tool to call, or null if no tool call is needed",
  "parameters": {"argument name": "argument value"},
  "reasoning": "your reasoning process and decision rationale",
  "final_answer": "your final answer if no tool call is needed, otherwise null"
}

Rules:
1. Exactly one of "tool_name" and "final_answer" must be non-null.
2. "tool_name" must be one of the available tools, spelled exactly.
3. "parameters" must match the tool's declared parameter types.
4. The output must be valid JSON."#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_optional_on_the_wire() {
        let record: DecisionRecord = serde_json::from_str("{}").unwrap();
        assert!(record.tool_name.is_none());
        assert!(record.parameters.is_none());
        assert!(record.final_answer.is_none());
        assert_eq!(record.reasoning, "");
    }

    #[test]
    fn test_full_record_deserializes() {
        let record: DecisionRecord = serde_json::from_str(
            r#"{"tool_name":"add","parameters":{"a":15,"b":27},"reasoning":"needs arithmetic","final_answer":null}"#,
        )
        .unwrap();
        assert_eq!(record.tool_name.as_deref(), Some("add"));
        assert_eq!(record.parameters.unwrap()["a"], 15);
        assert_eq!(record.reasoning, "needs arithmetic");
    }

    #[test]
    fn test_explicit_nulls_accepted() {
        let record: DecisionRecord = serde_json::from_str(
            r#"{"tool_name":null,"parameters":null,"reasoning":"","final_answer":"42"}"#,
        )
        .unwrap();
        assert!(record.tool_name.is_none());
        assert_eq!(record.final_answer.as_deref(), Some("42"));
    }
}
