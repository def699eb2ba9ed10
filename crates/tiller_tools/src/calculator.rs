//! Integer calculator tools.

use serde_json::json;
use tiller_core::{ParamKind, ParamSchema, ToolHandler, ToolOutcome, ToolSpec};

fn two_int_schema(first: &str, second: &str) -> ParamSchema {
    ParamSchema::new()
        .field("a", ParamKind::Integer, true, first)
        .field("b", ParamKind::Integer, true, second)
}

pub fn add_spec() -> ToolSpec {
    ToolSpec::new(
        "add",
        "Add two integers and return their sum",
        two_int_schema("First addend", "Second addend"),
    )
}

pub fn multiply_spec() -> ToolSpec {
    ToolSpec::new(
        "multiply",
        "Multiply two integers and return their product",
        two_int_schema("First factor", "Second factor"),
    )
}

/// Pull a required i64 out of validated arguments. The parser validates
/// against the schema before dispatch, so a miss here means a caller bypassed
/// validation; report it as a tool failure rather than panicking.
fn int_arg(
    arguments: &serde_json::Map<String, serde_json::Value>,
    name: &str,
) -> Result<i64, String> {
    arguments
        .get(name)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| format!("missing or non-integer parameter '{name}'"))
}

pub struct AddHandler;

#[async_trait::async_trait]
impl ToolHandler for AddHandler {
    async fn execute(
        &self,
        arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> ToolOutcome {
        let (a, b) = match (int_arg(arguments, "a"), int_arg(arguments, "b")) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => return ToolOutcome::Failure(e),
        };
        match a.checked_add(b) {
            Some(sum) => {
                tracing::debug!(a, b, sum, "add");
                ToolOutcome::Success(json!(sum))
            }
            None => ToolOutcome::Failure(format!("integer overflow: {a} + {b}")),
        }
    }
}

pub struct MultiplyHandler;

#[async_trait::async_trait]
impl ToolHandler for MultiplyHandler {
    async fn execute(
        &self,
        arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> ToolOutcome {
        let (a, b) = match (int_arg(arguments, "a"), int_arg(arguments, "b")) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => return ToolOutcome::Failure(e),
        };
        match a.checked_mul(b) {
            Some(product) => {
                tracing::debug!(a, b, product, "multiply");
                ToolOutcome::Success(json!(product))
            }
            None => ToolOutcome::Failure(format!("integer overflow: {a} * {b}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(a: serde_json::Value, b: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("a".into(), a);
        map.insert("b".into(), b);
        map
    }

    #[tokio::test]
    async fn test_add() {
        let outcome = AddHandler.execute(&args(json!(15), json!(27))).await;
        assert_eq!(outcome, ToolOutcome::Success(json!(42)));
    }

    #[tokio::test]
    async fn test_multiply() {
        let outcome = MultiplyHandler.execute(&args(json!(6), json!(7))).await;
        assert_eq!(outcome, ToolOutcome::Success(json!(42)));
    }

    #[tokio::test]
    async fn test_negative_operands() {
        let outcome = AddHandler.execute(&args(json!(-5), json!(3))).await;
        assert_eq!(outcome, ToolOutcome::Success(json!(-2)));
    }

    #[tokio::test]
    async fn test_missing_parameter_is_failure() {
        let mut map = serde_json::Map::new();
        map.insert("a".into(), json!(1));
        let outcome = AddHandler.execute(&map).await;
        assert!(matches!(outcome, ToolOutcome::Failure(msg) if msg.contains("'b'")));
    }

    #[tokio::test]
    async fn test_overflow_is_failure_not_panic() {
        let outcome = AddHandler.execute(&args(json!(i64::MAX), json!(1))).await;
        assert!(matches!(outcome, ToolOutcome::Failure(msg) if msg.contains("overflow")));
    }

    #[tokio::test]
    async fn test_specs_validate_their_own_arguments() {
        assert!(add_spec().params.validate(&args(json!(1), json!(2))).is_ok());
        assert!(multiply_spec()
            .params
            .validate(&args(json!(1), json!("2")))
            .is_err());
    }
}
