use crate::engine::resolver::{
    DecisionPolicy, DEFAULT_BUY_PERFORMANCE_THRESHOLD, DEFAULT_SELL_TREND_THRESHOLD,
};
use crate::engine::extractor::DEFAULT_RECENCY_WINDOW;
use crate::llm::Provider;
use crate::time::window::DEFAULT_LOOKBACK_DAYS;
use anyhow::{bail, Context};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TICKERS: &[&str] = &["AAPL", "TSLA", "AMZN", "NVDA"];
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_PRICE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SENTIMENT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PORT: u16 = 3000;

/// Which front-end drives the process. Picked once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrontendMode {
    #[default]
    Headless,
    Interactive,
}

impl FromStr for FrontendMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "headless" => Ok(Self::Headless),
            "interactive" => Ok(Self::Interactive),
            other => bail!("unknown frontend {other:?} (expected headless or interactive)"),
        }
    }
}

impl fmt::Display for FrontendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Headless => f.write_str("headless"),
            Self::Interactive => f.write_str("interactive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceSourceKind {
    /// `<data_dir>/<TICKER>.csv`
    #[default]
    File,
    Http,
}

impl FromStr for PriceSourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "http" => Ok(Self::Http),
            other => bail!("unknown price source {other:?} (expected file or http)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub frontend: FrontendMode,
    pub price_source: PriceSourceKind,
    pub data_dir: PathBuf,
    pub data_provider_base_url: Option<String>,
    pub data_provider_api_key: Option<String>,
    pub sentiment_provider: Provider,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub sentry_dsn: Option<String>,
    pub policy: DecisionPolicy,
    pub tickers: Vec<String>,
    pub default_ticker: String,
    pub lookback_days: u32,
    pub price_timeout: Duration,
    pub sentiment_timeout: Duration,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let frontend = match var("ADVISOR_FRONTEND") {
            Some(v) => v.parse::<FrontendMode>().context("ADVISOR_FRONTEND")?,
            None => FrontendMode::default(),
        };
        let price_source = match var("ADVISOR_PRICE_SOURCE") {
            Some(v) => v.parse::<PriceSourceKind>().context("ADVISOR_PRICE_SOURCE")?,
            None => PriceSourceKind::default(),
        };
        let sentiment_provider = match var("ADVISOR_SENTIMENT_PROVIDER") {
            Some(v) => v.parse::<Provider>().context("ADVISOR_SENTIMENT_PROVIDER")?,
            None => Provider::OpenAI,
        };

        let policy = DecisionPolicy {
            buy_performance_threshold: parse_or(
                var("ADVISOR_BUY_PERFORMANCE_THRESHOLD"),
                "ADVISOR_BUY_PERFORMANCE_THRESHOLD",
                DEFAULT_BUY_PERFORMANCE_THRESHOLD,
            )?,
            sell_trend_threshold: parse_or(
                var("ADVISOR_SELL_TREND_THRESHOLD"),
                "ADVISOR_SELL_TREND_THRESHOLD",
                DEFAULT_SELL_TREND_THRESHOLD,
            )?,
            recency_window: parse_or(
                var("ADVISOR_RECENCY_WINDOW"),
                "ADVISOR_RECENCY_WINDOW",
                DEFAULT_RECENCY_WINDOW,
            )?,
        };
        policy.validate().context("invalid decision policy")?;

        let tickers: Vec<String> = match var("ADVISOR_TICKERS") {
            Some(list) => list
                .split(',')
                .map(|t| t.trim().to_ascii_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
            None => DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
        };
        anyhow::ensure!(!tickers.is_empty(), "ADVISOR_TICKERS must list at least one ticker");

        let default_ticker = var("ADVISOR_DEFAULT_TICKER")
            .map(|t| t.to_ascii_uppercase())
            .unwrap_or_else(|| tickers[0].clone());

        Ok(Self {
            frontend,
            price_source,
            data_dir: var("ADVISOR_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            data_provider_base_url: var("DATA_PROVIDER_BASE_URL"),
            data_provider_api_key: var("DATA_PROVIDER_API_KEY"),
            sentiment_provider,
            openai_api_key: var("OPENAI_API_KEY"),
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            sentry_dsn: var("SENTRY_DSN"),
            policy,
            tickers,
            default_ticker,
            lookback_days: parse_or(
                var("ADVISOR_LOOKBACK_DAYS"),
                "ADVISOR_LOOKBACK_DAYS",
                DEFAULT_LOOKBACK_DAYS,
            )?,
            price_timeout: Duration::from_secs(parse_or(
                var("ADVISOR_PRICE_TIMEOUT_SECS"),
                "ADVISOR_PRICE_TIMEOUT_SECS",
                DEFAULT_PRICE_TIMEOUT_SECS,
            )?),
            sentiment_timeout: Duration::from_secs(parse_or(
                var("ADVISOR_SENTIMENT_TIMEOUT_SECS"),
                "ADVISOR_SENTIMENT_TIMEOUT_SECS",
                DEFAULT_SENTIMENT_TIMEOUT_SECS,
            )?),
            port: parse_or(var("PORT"), "PORT", DEFAULT_PORT)?,
        })
    }

    pub fn require_data_provider_base_url(&self) -> anyhow::Result<&str> {
        self.data_provider_base_url
            .as_deref()
            .context("DATA_PROVIDER_BASE_URL is required")
    }

    pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
        self.openai_api_key
            .as_deref()
            .context("OPENAI_API_KEY is required")
    }

    pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
        self.anthropic_api_key
            .as_deref()
            .context("ANTHROPIC_API_KEY is required")
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => v
            .parse::<T>()
            .with_context(|| format!("{key} has invalid value {v:?}")),
        None => Ok(default),
    }
}
