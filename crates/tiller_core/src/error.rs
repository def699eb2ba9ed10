use serde::Serialize;

// ============================================================================
// Parse failures (recoverable — stay inside the loop as transcript data)
// ============================================================================

/// Why a model response could not be classified into a valid intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// No JSON object could be extracted from the response text.
    InvalidSyntax,
    /// Both `tool_name` and `final_answer` were set, or neither was.
    Ambiguous,
    /// `tool_name` does not match any registered tool.
    UnknownTool,
    /// Arguments do not satisfy the referenced tool's parameter schema.
    SchemaMismatch,
}

impl ParseErrorKind {
    /// Stable identifier, used in prompt feedback and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSyntax => "invalid_syntax",
            Self::Ambiguous => "ambiguous",
            Self::UnknownTool => "unknown_tool",
            Self::SchemaMismatch => "schema_mismatch",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified parse failure. The raw model output lives alongside this in
/// the decision turn, so only the reason and a human-readable detail are
/// carried here. Never coerced into a valid intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{reason}: {detail}")]
pub struct ParseFailure {
    pub reason: ParseErrorKind,
    pub detail: String,
}

impl ParseFailure {
    pub fn new(reason: ParseErrorKind, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

// ============================================================================
// Fatal run failures (terminate the run, returned as structured outcome)
// ============================================================================

/// Conditions outside the model's ability to self-correct. These end the run;
/// they are returned to the caller together with the full transcript, never
/// thrown past the loop controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    #[error("model backend unavailable: {0}")]
    ModelUnavailable(String),
    #[error("step budget exhausted")]
    BudgetExceeded,
    #[error("model output unparsable after {0} consecutive attempts")]
    ParseRetriesExhausted(u32),
    #[error("run cancelled")]
    Cancelled,
}

// ============================================================================
// Registry errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate tool name: {0}")]
    DuplicateName(String),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}
