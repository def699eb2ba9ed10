//! Exponential backoff for transient HTTP failures.
//!
//! Retries 408/429/5xx and network errors; client errors (400, 401, 403, 404)
//! fail immediately.

use anyhow::Result;
use reqwest::{Response, StatusCode};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Run an HTTP operation until it succeeds, hits a non-retryable status, or
/// runs out of attempts. Returns the successful response or the last error.
pub async fn with_retry<F, Fut>(policy: &RetryPolicy, label: &str, operation: F) -> Result<Response>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<Response>>,
{
    let mut delay = policy.initial_delay;
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        match operation().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    if attempt > 1 {
                        tracing::info!("{label} succeeded on attempt {attempt}");
                    }
                    return Ok(response);
                }

                let body = response.text().await.unwrap_or_default();
                if !is_retryable_status(status) {
                    anyhow::bail!("{label} API error ({status}): {body}");
                }

                tracing::warn!(
                    "{label} returned {status} on attempt {attempt}/{}: {}",
                    policy.max_attempts,
                    body.chars().take(200).collect::<String>()
                );
                last_error = Some(format!("{label} ({status}): {body}"));
            }
            Err(e) => {
                tracing::warn!(
                    "{label} network error on attempt {attempt}/{}: {e}",
                    policy.max_attempts
                );
                last_error = Some(format!("{label}: {e}"));
            }
        }

        if attempt < policy.max_attempts {
            let sleep_time = delay + Duration::from_millis(jitter_ms());
            tracing::info!(
                "{label} retrying in {:.1}s (attempt {}/{})",
                sleep_time.as_secs_f64(),
                attempt + 1,
                policy.max_attempts
            );
            tokio::time::sleep(sleep_time).await;
            delay = Duration::from_secs_f64(
                (delay.as_secs_f64() * policy.backoff_factor).min(policy.max_delay.as_secs_f64()),
            );
        }
    }

    anyhow::bail!(
        "all {} attempts failed; last error: {}",
        policy.max_attempts,
        last_error.unwrap_or_else(|| "unknown".to_string())
    )
}

/// 0-500ms of jitter from the clock, enough to spread concurrent retries.
fn jitter_ms() -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 500) as u64
}
