//! Client for OpenAI-compatible chat-completion endpoints (DeepSeek, OpenAI,
//! and anything else speaking the same wire format).

use crate::llm::{CompletionParams, LlmClient};
use crate::retry::{with_retry, RetryPolicy};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;
use tiller_core::LlmConfig;

const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl OpenAiCompatClient {
    /// Build a client from config. The API key comes from `LLM_API_KEY`, or
    /// from `DEEPSEEK_API_KEY`/`OPENAI_API_KEY` to match the provider id.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = env::var("LLM_API_KEY")
            .or_else(|_| match config.provider.as_str() {
                "openai" => env::var("OPENAI_API_KEY"),
                _ => env::var("DEEPSEEK_API_KEY"),
            })
            .context("no API key: set LLM_API_KEY (or DEEPSEEK_API_KEY/OPENAI_API_KEY)")?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| match config.provider.as_str() {
                "openai" => OPENAI_BASE_URL.to_string(),
                _ => DEEPSEEK_BASE_URL.to_string(),
            })
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()?,
            api_key,
            base_url,
            model: config.model.clone(),
            retry: RetryPolicy::default(),
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn ask(&self, prompt: &str, params: &CompletionParams) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = with_retry(&self.retry, &self.model, || async {
            self.client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&payload)
                .send()
                .await
                .context("failed to send chat completion request")
        })
        .await?;

        let body: Value = response
            .json()
            .await
            .context("chat completion response was not JSON")?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .with_context(|| format!("chat completion response missing content: {body}"))?;
        Ok(content.to_string())
    }
}
