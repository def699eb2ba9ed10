use anyhow::Result;
use async_trait::async_trait;

/// Sampling parameters for one completion request.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0). Low by default — the loop wants
    /// parseable JSON, not creativity.
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.1,
        }
    }
}

/// The model call boundary: prompt text in, response text out.
///
/// Any error here is fatal to the current run. Transport-level retry (rate
/// limits, flaky networks) belongs to the implementation, not to the loop.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn ask(&self, prompt: &str, params: &CompletionParams) -> Result<String>;
}
