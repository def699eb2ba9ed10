//! Classify raw model output into a typed intent.
//!
//! Models wrap their JSON in prose or markdown fences, so extraction is
//! tiered: whole-text parse first, then fenced code blocks, then a
//! brace-balanced scan. The parser only classifies — it never executes
//! anything.

use crate::schema::DecisionRecord;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tiller_core::{Intent, ParseErrorKind, ParseFailure, ToolRegistry};

static RE_CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*\n?(.*?)```").unwrap());

const RECORD_FIELDS: [&str; 4] = ["tool_name", "parameters", "reasoning", "final_answer"];

/// Parse one model response against the current tool catalog.
pub fn parse_decision(raw: &str, registry: &ToolRegistry) -> Intent {
    let record = match extract_record(raw) {
        Ok(record) => record,
        Err(failure) => return Intent::Malformed(failure),
    };
    classify(record, registry)
}

/// Pull a single decision record out of free-form text.
fn extract_record(raw: &str) -> Result<DecisionRecord, ParseFailure> {
    let trimmed = raw.trim();

    // 1. The whole response is the JSON object.
    if let Some(record) = try_record(trimmed) {
        return Ok(record);
    }

    // 2. A fenced ```json block.
    for caps in RE_CODE_FENCE.captures_iter(trimmed) {
        let inner = caps.get(1).map_or("", |m| m.as_str()).trim();
        if let Some(record) = try_record(inner) {
            return Ok(record);
        }
    }

    // 3. A brace-balanced object embedded in prose.
    for candidate in BraceCandidates::new(trimmed) {
        if let Some(record) = try_record(candidate) {
            return Ok(record);
        }
    }

    Err(ParseFailure::new(
        ParseErrorKind::InvalidSyntax,
        "no decision object found in response",
    ))
}

/// Parse one candidate as a decision record. Every field is optional on the
/// wire, so any JSON object would deserialize; an object carrying none of the
/// record's fields is rejected here so that unrelated objects earlier in the
/// prose cannot shadow the real record.
fn try_record(candidate: &str) -> Option<DecisionRecord> {
    let object: Map<String, Value> = serde_json::from_str(candidate).ok()?;
    if !RECORD_FIELDS.iter().any(|field| object.contains_key(*field)) {
        return None;
    }
    serde_json::from_value(Value::Object(object)).ok()
}

/// Validate a record's field combination against the registry.
fn classify(record: DecisionRecord, registry: &ToolRegistry) -> Intent {
    match (record.tool_name, record.final_answer) {
        (Some(_), Some(_)) => Intent::Malformed(ParseFailure::new(
            ParseErrorKind::Ambiguous,
            "both tool_name and final_answer are set",
        )),
        (None, None) => Intent::Malformed(ParseFailure::new(
            ParseErrorKind::Ambiguous,
            "neither tool_name nor final_answer is set",
        )),
        (None, Some(text)) => Intent::FinalAnswer { text },
        (Some(tool_name), None) => {
            let spec = match registry.lookup(&tool_name) {
                Ok(registered) => &registered.spec,
                Err(_) => {
                    return Intent::Malformed(ParseFailure::new(
                        ParseErrorKind::UnknownTool,
                        format!("tool '{}' is not registered", tool_name),
                    ));
                }
            };
            let arguments = record.parameters.unwrap_or_default();
            if let Err(detail) = spec.params.validate(&arguments) {
                return Intent::Malformed(ParseFailure::new(
                    ParseErrorKind::SchemaMismatch,
                    format!("tool '{}': {}", tool_name, detail),
                ));
            }
            Intent::CallTool {
                tool_name,
                arguments,
                rationale: record.reasoning,
            }
        }
    }
}

/// Iterator over brace-balanced `{...}` substrings, string-literal aware.
/// Yields the outermost object starting at each top-level `{`.
struct BraceCandidates<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> BraceCandidates<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for BraceCandidates<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            if bytes[self.pos] != b'{' {
                self.pos += 1;
                continue;
            }
            let start = self.pos;
            let mut depth = 0usize;
            let mut in_string = false;
            let mut escaped = false;
            for (offset, &b) in bytes[start..].iter().enumerate() {
                if escaped {
                    escaped = false;
                    continue;
                }
                match b {
                    b'\\' if in_string => escaped = true,
                    b'"' => in_string = !in_string,
                    b'{' if !in_string => depth += 1,
                    b'}' if !in_string => {
                        depth -= 1;
                        if depth == 0 {
                            let end = start + offset + 1;
                            self.pos = end;
                            return Some(&self.text[start..end]);
                        }
                    }
                    _ => {}
                }
            }
            // Unbalanced from this position; skip past it.
            self.pos = start + 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tiller_core::{ParamKind, ParamSchema, ToolHandler, ToolOutcome, ToolSpec};

    struct NoopHandler;

    #[async_trait::async_trait]
    impl ToolHandler for NoopHandler {
        async fn execute(
            &self,
            _arguments: &serde_json::Map<String, serde_json::Value>,
        ) -> ToolOutcome {
            ToolOutcome::Success(json!(null))
        }
    }

    fn calc_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        let schema = ParamSchema::new()
            .field("a", ParamKind::Integer, true, "First number")
            .field("b", ParamKind::Integer, true, "Second number");
        registry
            .register(
                ToolSpec::new("add", "Add two numbers together", schema),
                Arc::new(NoopHandler),
            )
            .unwrap();
        registry
    }

    fn expect_malformed(intent: Intent) -> ParseFailure {
        match intent {
            Intent::Malformed(failure) => failure,
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_call_preserves_fields_verbatim() {
        let raw = r#"{"tool_name":"add","parameters":{"a":15,"b":27},"reasoning":"needs arithmetic","final_answer":null}"#;
        match parse_decision(raw, &calc_registry()) {
            Intent::CallTool {
                tool_name,
                arguments,
                rationale,
            } => {
                assert_eq!(tool_name, "add");
                assert_eq!(arguments["a"], json!(15));
                assert_eq!(arguments["b"], json!(27));
                assert_eq!(rationale, "needs arithmetic");
            }
            other => panic!("expected CallTool, got {:?}", other),
        }
    }

    #[test]
    fn test_final_answer() {
        let raw = r#"{"tool_name":null,"parameters":null,"reasoning":"done","final_answer":"42"}"#;
        match parse_decision(raw, &calc_registry()) {
            Intent::FinalAnswer { text } => assert_eq!(text, "42"),
            other => panic!("expected FinalAnswer, got {:?}", other),
        }
    }

    #[test]
    fn test_json_in_markdown_fence() {
        let raw = "Let me compute that.\n```json\n{\"tool_name\":\"add\",\"parameters\":{\"a\":1,\"b\":2},\"reasoning\":\"\",\"final_answer\":null}\n```";
        assert!(matches!(
            parse_decision(raw, &calc_registry()),
            Intent::CallTool { .. }
        ));
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let raw = r#"Sure! Here is my decision: {"tool_name":"add","parameters":{"a":1,"b":2},"reasoning":"prose-wrapped {braces} inside","final_answer":null} hope that helps."#;
        assert!(matches!(
            parse_decision(raw, &calc_registry()),
            Intent::CallTool { .. }
        ));
    }

    #[test]
    fn test_unrelated_object_before_record_is_skipped() {
        let raw = r#"Session state: {"retries": 2, "cache": true}. My decision: {"tool_name":"add","parameters":{"a":1,"b":2},"reasoning":"","final_answer":null}"#;
        assert!(matches!(
            parse_decision(raw, &calc_registry()),
            Intent::CallTool { .. }
        ));
    }

    #[test]
    fn test_bare_empty_object_is_invalid_syntax() {
        let failure = expect_malformed(parse_decision("{}", &calc_registry()));
        assert_eq!(failure.reason, ParseErrorKind::InvalidSyntax);
    }

    #[test]
    fn test_both_fields_set_is_ambiguous() {
        let raw = r#"{"tool_name":"add","parameters":{"a":1,"b":2},"reasoning":"","final_answer":"3"}"#;
        let failure = expect_malformed(parse_decision(raw, &calc_registry()));
        assert_eq!(failure.reason, ParseErrorKind::Ambiguous);
    }

    #[test]
    fn test_neither_field_set_is_ambiguous() {
        let raw = r#"{"tool_name":null,"parameters":null,"reasoning":"hmm","final_answer":null}"#;
        let failure = expect_malformed(parse_decision(raw, &calc_registry()));
        assert_eq!(failure.reason, ParseErrorKind::Ambiguous);
    }

    #[test]
    fn test_unknown_tool_surfaced_not_swallowed() {
        let raw = r#"{"tool_name":"substract","parameters":{"a":1,"b":2},"reasoning":"","final_answer":null}"#;
        let failure = expect_malformed(parse_decision(raw, &calc_registry()));
        assert_eq!(failure.reason, ParseErrorKind::UnknownTool);
        assert!(failure.detail.contains("substract"));
    }

    #[test]
    fn test_tool_name_is_case_sensitive() {
        let raw = r#"{"tool_name":"Add","parameters":{"a":1,"b":2},"reasoning":"","final_answer":null}"#;
        let failure = expect_malformed(parse_decision(raw, &calc_registry()));
        assert_eq!(failure.reason, ParseErrorKind::UnknownTool);
    }

    #[test]
    fn test_missing_required_argument_is_schema_mismatch() {
        let raw = r#"{"tool_name":"add","parameters":{"a":1},"reasoning":"","final_answer":null}"#;
        let failure = expect_malformed(parse_decision(raw, &calc_registry()));
        assert_eq!(failure.reason, ParseErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_wrong_argument_type_is_schema_mismatch() {
        let raw = r#"{"tool_name":"add","parameters":{"a":"one","b":2},"reasoning":"","final_answer":null}"#;
        let failure = expect_malformed(parse_decision(raw, &calc_registry()));
        assert_eq!(failure.reason, ParseErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_garbage_is_invalid_syntax() {
        let failure = expect_malformed(parse_decision(
            "I'll just answer directly: 42",
            &calc_registry(),
        ));
        assert_eq!(failure.reason, ParseErrorKind::InvalidSyntax);
    }

    #[test]
    fn test_empty_response_is_invalid_syntax() {
        let failure = expect_malformed(parse_decision("", &calc_registry()));
        assert_eq!(failure.reason, ParseErrorKind::InvalidSyntax);
    }

    #[test]
    fn test_missing_parameters_defaults_to_empty_then_schema_checked() {
        // Required fields absent → schema mismatch, not a crash.
        let raw = r#"{"tool_name":"add","reasoning":"","final_answer":null}"#;
        let failure = expect_malformed(parse_decision(raw, &calc_registry()));
        assert_eq!(failure.reason, ParseErrorKind::SchemaMismatch);
    }

    proptest::proptest! {
        #[test]
        fn prop_valid_integer_calls_always_classify_as_call_tool(a: i64, b: i64) {
            let raw = format!(
                r#"{{"tool_name":"add","parameters":{{"a":{a},"b":{b}}},"reasoning":"r","final_answer":null}}"#
            );
            let intent = parse_decision(&raw, &calc_registry());
            let is_call = matches!(&intent, Intent::CallTool { .. });
            proptest::prop_assert!(is_call, "expected CallTool, got {:?}", intent);
        }

        #[test]
        fn prop_final_answer_text_preserved(text in "[^\"\\\\]*") {
            let raw = serde_json::to_string(&serde_json::json!({
                "tool_name": null,
                "parameters": null,
                "reasoning": "",
                "final_answer": text,
            })).unwrap();
            match parse_decision(&raw, &calc_registry()) {
                Intent::FinalAnswer { text: parsed } => proptest::prop_assert_eq!(parsed, text),
                other => panic!("expected FinalAnswer, got {:?}", other),
            }
        }
    }
}
