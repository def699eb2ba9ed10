//! Decision-prompt assembly: system preamble, tool catalog, output-format
//! instructions, and the role-tagged turn history.

use crate::schema::format_instructions;
use tiller_core::{Intent, ToolOutcome, ToolRegistry, Transcript, Turn};

/// Render the tool catalog exactly as the registry orders it, so the same
/// registry always produces the same prompt.
pub fn render_catalog(registry: &ToolRegistry) -> String {
    let mut blocks = Vec::new();
    for spec in registry.catalog() {
        let params = if spec.params.fields().is_empty() {
            "No parameters".to_string()
        } else {
            serde_json::to_string_pretty(&spec.params.to_json_schema()["properties"])
                .unwrap_or_else(|_| "{}".to_string())
        };
        blocks.push(format!(
            "- {}: {}\n  Parameters: {}",
            spec.name, spec.description, params
        ));
    }
    blocks.join("\n\n")
}

/// Render the transcript as role-tagged text.
///
/// Malformed decisions are followed by a correction line so the model sees
/// its own mistake; tool failures are rendered as errors, not hidden.
pub fn render_history(transcript: &Transcript) -> String {
    let mut lines = Vec::new();
    for turn in transcript.turns() {
        match turn {
            Turn::User { text } => lines.push(format!("user: {}", text)),
            Turn::Decision { raw, intent } => {
                lines.push(format!("assistant: {}", raw.trim()));
                if let Intent::Malformed(failure) = intent {
                    lines.push(format!(
                        "system: your previous reply was rejected ({}): {}. Reply again following the required JSON format.",
                        failure.reason, failure.detail
                    ));
                }
            }
            Turn::ToolResult { tool_name, outcome } => match outcome {
                ToolOutcome::Success(value) => {
                    lines.push(format!("tool[{}]: {}", tool_name, value))
                }
                ToolOutcome::Failure(error) => {
                    lines.push(format!("tool[{}] error: {}", tool_name, error))
                }
            },
        }
    }
    lines.join("\n")
}

/// The full decision prompt for the current state.
pub fn render_decision_prompt(registry: &ToolRegistry, transcript: &Transcript) -> String {
    format!(
        "You are an assistant that answers user requests, calling tools when they help.\n\n\
         Available tools:\n{}\n\n\
         {}\n\n\
         Notes:\n\
         1. Call a tool when the request needs one (for example a calculation).\n\
         2. Answer directly when no tool is needed.\n\
         3. After a tool result appears in the conversation, use it to continue or to answer.\n\n\
         Conversation so far:\n{}",
        render_catalog(registry),
        format_instructions(),
        render_history(transcript),
    )
}
