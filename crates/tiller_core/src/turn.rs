//! The conversation transcript: an append-only, ordered log of turns.
//!
//! Insertion order is meaning-bearing — the transcript is both the
//! chronological record of a run and the context rendered into each decision
//! prompt. Turns are immutable once appended; corrections happen by appending
//! new turns, never by rewriting history.

use crate::error::ParseFailure;
use serde::Serialize;
use serde_json::{Map, Value};

/// The classified meaning of one model response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// The model wants a tool executed with the given arguments.
    CallTool {
        tool_name: String,
        arguments: Map<String, Value>,
        rationale: String,
    },
    /// The model is done; `text` is the answer for the user.
    FinalAnswer { text: String },
    /// The response could not be classified. Recorded as-is so the model can
    /// see its own mistake on the next decision step.
    Malformed(ParseFailure),
}

/// Result of one tool execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    Success(Value),
    Failure(String),
}

/// One immutable record in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    /// The original or a follow-up user request.
    User { text: String },
    /// The model's output for one decision step, raw and classified.
    Decision { raw: String, intent: Intent },
    /// The outcome of one execution step.
    ToolResult {
        tool_name: String,
        outcome: ToolOutcome,
    },
}

/// Ordered, append-only sequence of turns. One run owns its transcript
/// exclusively; updates are functional (consume and return) so a step can
/// never mutate a caller's snapshot in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transcript with the user's request as the first turn.
    pub fn seeded(request: &str) -> Self {
        Self::new().with(Turn::User {
            text: request.to_string(),
        })
    }

    /// Append a turn, returning the extended transcript.
    pub fn with(mut self, turn: Turn) -> Self {
        self.turns.push(turn);
        self
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
