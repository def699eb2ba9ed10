//! Mock LLM client — deterministic responses for testing without API keys.

use crate::llm::{CompletionParams, LlmClient};
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

enum Behavior {
    /// Pop the next response per call; error once exhausted.
    Scripted(Mutex<VecDeque<String>>),
    /// Same response for every call.
    Canned(String),
    /// Every call fails with this message.
    Failing(String),
}

pub struct MockClient {
    behavior: Behavior,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockClient {
    /// Replies with the given responses in order, then errors.
    pub fn scripted(responses: Vec<String>) -> Self {
        Self {
            behavior: Behavior::Scripted(Mutex::new(responses.into())),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Like [`scripted`](Self::scripted), but each call takes `delay` first.
    pub fn scripted_with_delay(responses: Vec<String>, delay: Duration) -> Self {
        Self {
            behavior: Behavior::Scripted(Mutex::new(responses.into())),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always replies with the same final-answer payload. Useful for running
    /// the CLI without network access.
    pub fn canned() -> Self {
        Self {
            behavior: Behavior::Canned(
                r#"{"tool_name": null, "parameters": null, "reasoning": "mock provider", "final_answer": "(mock response) I received your request."}"#.to_string(),
            ),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails, as a dead backend would.
    pub fn failing(message: &str) -> Self {
        Self {
            behavior: Behavior::Failing(message.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `ask` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Acquire)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    async fn ask(&self, _prompt: &str, _params: &CompletionParams) -> Result<String> {
        self.calls.fetch_add(1, Ordering::AcqRel);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behavior {
            Behavior::Scripted(responses) => responses
                .lock()
                .expect("mock response queue poisoned")
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("mock client: script exhausted")),
            Behavior::Canned(response) => Ok(response.clone()),
            Behavior::Failing(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order_then_errors() {
        let client = MockClient::scripted(vec!["one".into(), "two".into()]);
        let params = CompletionParams::default();
        assert_eq!(client.ask("p", &params).await.unwrap(), "one");
        assert_eq!(client.ask("p", &params).await.unwrap(), "two");
        assert!(client.ask("p", &params).await.is_err());
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_canned_is_parseable_final_answer() {
        let client = MockClient::canned();
        let raw = client.ask("p", &CompletionParams::default()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["final_answer"].is_string());
    }

    #[tokio::test]
    async fn test_failing_always_errors() {
        let client = MockClient::failing("connection refused");
        let err = client
            .ask("p", &CompletionParams::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
