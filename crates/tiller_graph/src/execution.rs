//! The execution step: run the requested tool and record its outcome.

use tiller_core::{Intent, RunContext, ToolOutcome, ToolRegistry, Transcript, Turn};

pub struct ExecutionStep;

impl ExecutionStep {
    pub fn new() -> Self {
        Self
    }

    pub fn name(&self) -> &'static str {
        "tools"
    }

    /// Execute the tool named by the latest decision.
    ///
    /// Appends exactly one tool-result turn and returns the extended
    /// transcript; the input is never mutated. Executor failures are captured
    /// as data visible to the model on the next decision step; they never
    /// abort the loop.
    pub async fn run(
        &self,
        ctx: &RunContext,
        registry: &ToolRegistry,
        transcript: &Transcript,
    ) -> Transcript {
        let (tool_name, arguments) = match transcript.last() {
            Some(Turn::Decision {
                intent:
                    Intent::CallTool {
                        tool_name,
                        arguments,
                        ..
                    },
                ..
            }) => (tool_name.clone(), arguments.clone()),
            other => {
                // The router only sends us here after a CallTool decision.
                tracing::error!(run_id = %ctx.run_id, ?other, "execution step without a pending tool call");
                return transcript.clone();
            }
        };

        tracing::info!(run_id = %ctx.run_id, step = self.name(), tool = %tool_name, ?arguments, "executing tool");

        let outcome = match registry.lookup(&tool_name) {
            Ok(registered) => registered.handler.execute(&arguments).await,
            // Unreachable for parser-validated intents; recorded as data anyway.
            Err(e) => ToolOutcome::Failure(e.to_string()),
        };

        match &outcome {
            ToolOutcome::Success(value) => {
                tracing::info!(run_id = %ctx.run_id, tool = %tool_name, %value, "tool succeeded")
            }
            ToolOutcome::Failure(error) => {
                tracing::warn!(run_id = %ctx.run_id, tool = %tool_name, %error, "tool failed")
            }
        }

        transcript.clone().with(Turn::ToolResult { tool_name, outcome })
    }
}

impl Default for ExecutionStep {
    fn default() -> Self {
        Self::new()
    }
}
