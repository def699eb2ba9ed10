//! Pure routing: the latest turn decides the next step.

use tiller_core::{FailureReason, Intent, Turn};

/// Where the loop goes next.
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    Decide,
    Execute,
    Done(String),
    Fail(FailureReason),
}

/// Route from the latest turn.
///
/// `consecutive_parse_failures` counts malformed decisions since the last
/// well-formed one; hitting `parse_retry_limit` ends the run instead of
/// looping forever on a model that cannot produce the wire format.
pub fn route(last: &Turn, consecutive_parse_failures: u32, parse_retry_limit: u32) -> NextStep {
    match last {
        // The seeded start: nothing decided yet.
        Turn::User { .. } => NextStep::Decide,
        Turn::ToolResult { .. } => NextStep::Decide,
        Turn::Decision { intent, .. } => match intent {
            Intent::CallTool { .. } => NextStep::Execute,
            Intent::FinalAnswer { text } => NextStep::Done(text.clone()),
            Intent::Malformed(_) => {
                if consecutive_parse_failures >= parse_retry_limit {
                    NextStep::Fail(FailureReason::ParseRetriesExhausted(
                        consecutive_parse_failures,
                    ))
                } else {
                    NextStep::Decide
                }
            }
        },
    }
}
