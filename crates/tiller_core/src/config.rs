use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TillerConfig {
    pub llm: LlmConfig,
    pub run: RunConfig,
}

impl TillerConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. Env var overrides are applied after loading.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: TillerConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return
    /// defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse() {
                self.llm.max_tokens = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
        if let Ok(v) = std::env::var("TILLER_MAX_STEPS") {
            if let Ok(n) = v.parse() {
                self.run.max_steps = n;
            }
        }
        if let Ok(v) = std::env::var("TILLER_PARSE_RETRY_LIMIT") {
            if let Ok(n) = v.parse() {
                self.run.parse_retry_limit = n;
            }
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider id: "deepseek", "openai", or "mock".
    pub provider: String,
    pub model: String,
    /// Override for the provider's default endpoint.
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "deepseek".to_string(),
            model: "deepseek-chat".to_string(),
            base_url: None,
            max_tokens: 1024,
            temperature: 0.1,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Maximum decision steps per run.
    pub max_steps: u32,
    /// Consecutive malformed decisions tolerated before the run fails.
    pub parse_retry_limit: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: 8,
            parse_retry_limit: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = TillerConfig::default();
        assert_eq!(cfg.llm.provider, "deepseek");
        assert_eq!(cfg.llm.model, "deepseek-chat");
        assert_eq!(cfg.run.max_steps, 8);
        assert_eq!(cfg.run.parse_retry_limit, 3);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let cfg: TillerConfig = toml::from_str(
            r#"
            [llm]
            model = "gpt-4o-mini"
            provider = "openai"

            [run]
            max_steps = 4
            "#,
        )
        .unwrap();
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.llm.max_tokens, 1024);
        assert_eq!(cfg.run.max_steps, 4);
        assert_eq!(cfg.run.parse_retry_limit, 3);
    }
}
