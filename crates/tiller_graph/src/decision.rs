//! The decision step: ask the model for its next move and classify it.

use crate::llm::{CompletionParams, LlmClient};
use crate::parser::parse_decision;
use crate::prompt::render_decision_prompt;
use std::sync::Arc;
use tiller_core::{FailureReason, Intent, RunContext, ToolRegistry, Transcript, Turn};

pub struct DecisionStep {
    client: Arc<dyn LlmClient>,
    params: CompletionParams,
}

impl DecisionStep {
    pub fn new(client: Arc<dyn LlmClient>, params: CompletionParams) -> Self {
        Self { client, params }
    }

    pub fn name(&self) -> &'static str {
        "agent"
    }

    /// Run one decision step.
    ///
    /// Appends exactly one decision turn — even a malformed response is
    /// recorded, so the transcript and the step budget both advance and the
    /// model can see its own mistake on retry. The input transcript is never
    /// mutated; a new one (old sequence plus the new turn) is returned, so
    /// callers can keep snapshots. A model-call failure is fatal to the run.
    pub async fn run(
        &self,
        ctx: &RunContext,
        registry: &ToolRegistry,
        transcript: &Transcript,
    ) -> Result<Transcript, FailureReason> {
        let prompt = render_decision_prompt(registry, transcript);

        let raw = match self.client.ask(&prompt, &self.params).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(run_id = %ctx.run_id, error = %e, "model call failed");
                return Err(FailureReason::ModelUnavailable(format!("{e:#}")));
            }
        };
        tracing::debug!(run_id = %ctx.run_id, step = self.name(), raw = %raw, "model response");

        let intent = parse_decision(&raw, registry);
        match &intent {
            Intent::CallTool {
                tool_name,
                rationale,
                ..
            } => {
                tracing::info!(run_id = %ctx.run_id, tool = %tool_name, %rationale, "decision: call tool")
            }
            Intent::FinalAnswer { .. } => {
                tracing::info!(run_id = %ctx.run_id, "decision: final answer")
            }
            Intent::Malformed(failure) => {
                tracing::warn!(run_id = %ctx.run_id, reason = %failure.reason, detail = %failure.detail, "decision: malformed")
            }
        }

        Ok(transcript.clone().with(Turn::Decision { raw, intent }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockClient;
    use serde_json::json;
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

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolSpec::new(
                    "add",
                    "Add two numbers together",
                    ParamSchema::new()
                        .field("a", ParamKind::Integer, true, "First number")
                        .field("b", ParamKind::Integer, true, "Second number"),
                ),
                Arc::new(NoopHandler),
            )
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_appends_exactly_one_decision_turn() {
        let client = Arc::new(MockClient::scripted(vec![
            r#"{"tool_name":null,"parameters":null,"reasoning":"","final_answer":"hi"}"#.into(),
        ]));
        let step = DecisionStep::new(client, CompletionParams::default());
        let transcript = step
            .run(&RunContext::new(), &registry(), &Transcript::seeded("hello"))
            .await
            .unwrap();
        assert_eq!(transcript.len(), 2);
        assert!(matches!(
            transcript.last(),
            Some(Turn::Decision {
                intent: Intent::FinalAnswer { .. },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_malformed_response_still_recorded() {
        let client = Arc::new(MockClient::scripted(vec!["no json here".into()]));
        let step = DecisionStep::new(client, CompletionParams::default());
        let transcript = step
            .run(&RunContext::new(), &registry(), &Transcript::seeded("hello"))
            .await
            .unwrap();
        assert_eq!(transcript.len(), 2);
        assert!(matches!(
            transcript.last(),
            Some(Turn::Decision {
                intent: Intent::Malformed(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_model_failure_is_model_unavailable() {
        let client = Arc::new(MockClient::failing("connection refused"));
        let step = DecisionStep::new(client, CompletionParams::default());
        let err = step
            .run(&RunContext::new(), &registry(), &Transcript::seeded("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, FailureReason::ModelUnavailable(_)));
    }
}
