use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::llm::error::SentimentFetchError;

pub mod anthropic;
pub mod error;
pub mod fixture;
pub mod openai;
pub mod prompts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    /// Any OpenAI-compatible chat-completions endpoint (OpenRouter by default).
    OpenAI,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" | "openrouter" => Ok(Self::OpenAI),
            other => anyhow::bail!("unknown sentiment provider {other:?} (expected openai or anthropic)"),
        }
    }
}

/// Produces a short natural-language read on recent news tone for a ticker.
#[async_trait::async_trait]
pub trait SentimentSource: Send + Sync {
    /// Short label for logs.
    fn source_name(&self) -> &'static str;

    async fn fetch_sentiment_summary(&self, ticker: &str) -> anyhow::Result<String>;
}

const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Where and how a provider client talks to its API.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// `{prefix}_BASE_URL`, `{prefix}_MODEL`, `{prefix}_MAX_TOKENS` and `{prefix}_TIMEOUT_SECS`
    /// override the given defaults.
    pub fn from_env(prefix: &str, base_url: &str, model: &str) -> Self {
        Self::from_lookup(prefix, base_url, model, |key| std::env::var(key).ok())
    }

    /// Blank values and unparseable numbers fall back to the default.
    pub fn from_lookup(
        prefix: &str,
        base_url: &str,
        model: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let var = |name: &str| {
            lookup(&format!("{prefix}_{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut endpoint = Self::new(
            var("BASE_URL").unwrap_or_else(|| base_url.to_string()),
            var("MODEL").unwrap_or_else(|| model.to_string()),
        );
        if let Some(n) = var("MAX_TOKENS").and_then(|s| s.parse().ok()) {
            endpoint.max_tokens = n;
        }
        if let Some(secs) = var("TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            endpoint.timeout = Duration::from_secs(secs);
        }
        endpoint
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("failed to build reqwest client")
    }
}

/// Reads a provider reply, keeping the raw JSON next to the decoded body.
async fn read_reply<T: DeserializeOwned>(
    provider: Provider,
    res: reqwest::Response,
) -> anyhow::Result<(serde_json::Value, T)> {
    let status = res.status();
    let text = res
        .text()
        .await
        .with_context(|| format!("failed to read {provider} response body"))?;
    if !status.is_success() {
        return Err(SentimentFetchError::http(provider, status, text).into());
    }

    let raw_json = serde_json::from_str::<serde_json::Value>(&text)
        .with_context(|| format!("{provider} returned invalid JSON: {text}"))?;
    let parsed = serde_json::from_value::<T>(raw_json.clone())
        .with_context(|| format!("unexpected {provider} response shape"))?;
    Ok((raw_json, parsed))
}
