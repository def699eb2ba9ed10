//! The loop controller: an explicit state machine over decision, execution,
//! and routing, with step-budget accounting and cooperative cancellation in
//! one place.

use crate::decision::DecisionStep;
use crate::execution::ExecutionStep;
use crate::llm::{CompletionParams, LlmClient};
use crate::router::{route, NextStep};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tiller_core::{FailureReason, Intent, RunContext, ToolRegistry, Transcript, Turn};

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Done(String),
    Failed(FailureReason),
}

/// What a run hands back: the outcome plus the full transcript, success or
/// not, so callers can always inspect how the loop got there.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub transcript: Transcript,
}

/// Loop controller states. Terminal states are final: once reached, no
/// further step runs.
#[derive(Debug)]
enum LoopState {
    Deciding,
    Executing,
    Done(String),
    Failed(FailureReason),
}

/// The agent graph: a decision node and a tool node joined in a cycle, the
/// router choosing the edge after every step.
pub struct AgentGraph {
    registry: Arc<ToolRegistry>,
    decision: DecisionStep,
    execution: ExecutionStep,
    parse_retry_limit: u32,
}

impl AgentGraph {
    pub fn new(registry: Arc<ToolRegistry>, client: Arc<dyn LlmClient>) -> Self {
        Self::with_params(registry, client, CompletionParams::default())
    }

    pub fn with_params(
        registry: Arc<ToolRegistry>,
        client: Arc<dyn LlmClient>,
        params: CompletionParams,
    ) -> Self {
        Self {
            registry,
            decision: DecisionStep::new(client, params),
            execution: ExecutionStep::new(),
            parse_retry_limit: 3,
        }
    }

    /// Consecutive malformed decisions tolerated before the run fails.
    pub fn with_parse_retry_limit(mut self, limit: u32) -> Self {
        self.parse_retry_limit = limit;
        self
    }

    pub fn name(&self) -> &'static str {
        "simple_agent"
    }

    pub fn description(&self) -> &'static str {
        "An agent graph with tool calling support"
    }

    /// Drive the loop until a final answer, a fatal failure, or budget
    /// exhaustion. `max_steps` bounds the number of decision steps.
    pub async fn run(&self, request: &str, max_steps: u32) -> RunReport {
        self.run_with_cancel(request, max_steps, Arc::new(AtomicBool::new(false)))
            .await
    }

    /// Like [`run`](Self::run), with a caller-held cancellation token.
    ///
    /// The token belongs to this run alone: setting it stops this run at the
    /// next step boundary with `Failed(Cancelled)` and the transcript so far.
    /// Concurrent runs on the same graph each carry their own token, so
    /// cancelling one never touches another.
    #[tracing::instrument(skip(self, request, cancelled), fields(graph = self.name()))]
    pub async fn run_with_cancel(
        &self,
        request: &str,
        max_steps: u32,
        cancelled: Arc<AtomicBool>,
    ) -> RunReport {
        let ctx = RunContext::new();
        tracing::info!(run_id = %ctx.run_id, %request, max_steps, "run started");

        let mut transcript = Transcript::seeded(request);
        let mut remaining = max_steps;
        let mut consecutive_parse_failures = 0u32;
        let mut state = LoopState::Deciding;

        let outcome = loop {
            match state {
                LoopState::Deciding => {
                    if cancelled.load(Ordering::Acquire) {
                        state = LoopState::Failed(FailureReason::Cancelled);
                        continue;
                    }
                    if remaining == 0 {
                        state = LoopState::Failed(FailureReason::BudgetExceeded);
                        continue;
                    }
                    // Decrement before dispatch so the budget edge is exact.
                    remaining -= 1;

                    match self.decision.run(&ctx, &self.registry, &transcript).await {
                        Ok(extended) => transcript = extended,
                        Err(reason) => {
                            state = LoopState::Failed(reason);
                            continue;
                        }
                    }

                    consecutive_parse_failures = match transcript.last() {
                        Some(Turn::Decision {
                            intent: Intent::Malformed(_),
                            ..
                        }) => consecutive_parse_failures + 1,
                        _ => 0,
                    };

                    state = self.next_state(&transcript, consecutive_parse_failures);
                }

                LoopState::Executing => {
                    if cancelled.load(Ordering::Acquire) {
                        state = LoopState::Failed(FailureReason::Cancelled);
                        continue;
                    }
                    // Executing with no budget left only feeds a decision we
                    // will never take.
                    if remaining == 0 {
                        state = LoopState::Failed(FailureReason::BudgetExceeded);
                        continue;
                    }

                    transcript = self.execution.run(&ctx, &self.registry, &transcript).await;
                    state = self.next_state(&transcript, consecutive_parse_failures);
                }

                LoopState::Done(answer) => {
                    tracing::info!(run_id = %ctx.run_id, "run finished");
                    break RunOutcome::Done(answer);
                }
                LoopState::Failed(reason) => {
                    tracing::warn!(run_id = %ctx.run_id, %reason, "run failed");
                    break RunOutcome::Failed(reason);
                }
            }
        };

        RunReport {
            outcome,
            transcript,
        }
    }

    fn next_state(&self, transcript: &Transcript, consecutive_parse_failures: u32) -> LoopState {
        // The transcript is never empty here: it was seeded with a user turn.
        let last = match transcript.last() {
            Some(turn) => turn,
            None => return LoopState::Failed(FailureReason::BudgetExceeded),
        };
        match route(last, consecutive_parse_failures, self.parse_retry_limit) {
            NextStep::Decide => LoopState::Deciding,
            NextStep::Execute => LoopState::Executing,
            NextStep::Done(answer) => LoopState::Done(answer),
            NextStep::Fail(reason) => LoopState::Failed(reason),
        }
    }
}
