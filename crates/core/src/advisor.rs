use crate::config::{PriceSourceKind, Settings};
use crate::domain::price::PriceSeries;
use crate::domain::recommendation::{AdviceReport, RecommendationOutcome};
use crate::domain::sentiment::SentimentSummary;
use crate::engine::{extract_signal_with_window, DecisionPolicy};
use crate::error::{AdvisorError, AdvisorResult};
use crate::ingest::file::CsvFilePriceSource;
use crate::ingest::http::HttpJsonPriceSource;
use crate::ingest::PriceSource;
use crate::llm::anthropic::AnthropicClient;
use crate::llm::openai::OpenAiClient;
use crate::llm::{Provider, SentimentSource};
use crate::time::DateRange;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// One ticker over one date range. Carries everything a run needs; nothing is read from
/// process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceRequest {
    pub ticker: String,
    pub range: DateRange,
}

impl AdviceRequest {
    pub fn new(ticker: &str, range: DateRange) -> AdvisorResult<Self> {
        Ok(Self {
            ticker: normalize_ticker(ticker)?,
            range,
        })
    }
}

/// Trims and upper-cases; rejects blanks and anything that could escape a file name.
pub fn normalize_ticker(raw: &str) -> AdvisorResult<String> {
    let ticker = raw.trim().to_ascii_uppercase();
    if ticker.is_empty() {
        return Err(AdvisorError::invalid_request("ticker must be non-empty"));
    }
    if !ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
        || ticker.starts_with('.')
    {
        return Err(AdvisorError::invalid_request(format!(
            "ticker {ticker:?} contains unsupported characters"
        )));
    }
    Ok(ticker)
}

pub struct Advisor {
    prices: Arc<dyn PriceSource>,
    sentiment: Arc<dyn SentimentSource>,
    policy: DecisionPolicy,
    price_timeout: Duration,
    sentiment_timeout: Duration,
    preview_rows: usize,
}

impl Advisor {
    pub fn new(
        prices: Arc<dyn PriceSource>,
        sentiment: Arc<dyn SentimentSource>,
        policy: DecisionPolicy,
    ) -> Self {
        Self {
            prices,
            sentiment,
            policy,
            price_timeout: Duration::from_secs(30),
            sentiment_timeout: Duration::from_secs(60),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    pub fn with_timeouts(mut self, price_timeout: Duration, sentiment_timeout: Duration) -> Self {
        self.price_timeout = price_timeout;
        self.sentiment_timeout = sentiment_timeout;
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    /// Wires the configured price and sentiment collaborators.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let prices: Arc<dyn PriceSource> = match settings.price_source {
            PriceSourceKind::File => Arc::new(CsvFilePriceSource::new(&settings.data_dir)),
            PriceSourceKind::Http => Arc::new(HttpJsonPriceSource::from_settings(settings)?),
        };
        let sentiment: Arc<dyn SentimentSource> = match settings.sentiment_provider {
            Provider::OpenAI => Arc::new(OpenAiClient::from_settings(settings)?),
            Provider::Anthropic => Arc::new(AnthropicClient::from_settings(settings)?),
        };

        tracing::info!(
            price_source = prices.source_name(),
            sentiment_source = sentiment.source_name(),
            "advisor collaborators configured"
        );

        Ok(Self::new(prices, sentiment, settings.policy)
            .with_timeouts(settings.price_timeout, settings.sentiment_timeout))
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Runs one advisory cycle.
    ///
    /// Price and sentiment are fetched concurrently. Price problems abort the run and
    /// drop the pending sentiment request; sentiment problems only leave the
    /// recommendation `NotComputed`.
    pub async fn advise(&self, req: &AdviceRequest) -> AdvisorResult<AdviceReport> {
        let sentiment = async { Ok::<_, AdvisorError>(self.load_sentiment(&req.ticker).await) };
        let (series, sentiment) = tokio::try_join!(self.load_series(req), sentiment)?;

        let features = extract_signal_with_window(&series, self.policy.recency_window)?;

        let (outcome, sentiment_summary, sentiment_positive) = match sentiment {
            Ok(summary) => {
                let positive = summary.is_positive();
                let recommendation = self.policy.resolve_features(&features, positive);
                (
                    RecommendationOutcome::Computed { recommendation },
                    Some(summary.as_str().to_string()),
                    Some(positive),
                )
            }
            Err(err) => {
                tracing::warn!(ticker = %req.ticker, error = %err, "recommendation not computed");
                (
                    RecommendationOutcome::NotComputed {
                        reason: err.to_string(),
                    },
                    None,
                    None,
                )
            }
        };

        tracing::info!(
            ticker = %req.ticker,
            bars = series.len(),
            recent_performance = features.recent_performance,
            recent_trend = features.recent_trend,
            outcome = %outcome,
            "advisory cycle complete"
        );

        Ok(AdviceReport {
            ticker: req.ticker.clone(),
            range: req.range,
            generated_at: chrono::Utc::now(),
            bars: series.len(),
            latest_price: features.latest_price,
            recent_performance: features.recent_performance,
            recent_trend: features.recent_trend,
            window_len: features.window_len,
            sentiment_summary,
            sentiment_positive,
            outcome,
            head: series.head(self.preview_rows).to_vec(),
            tail: series.tail(self.preview_rows).to_vec(),
        })
    }

    /// Fetches and validates the series. Empty results never reach the extractor.
    pub async fn load_series(&self, req: &AdviceRequest) -> AdvisorResult<PriceSeries> {
        let source = self.prices.source_name();
        let fetch = self
            .prices
            .fetch_price_series(&req.ticker, req.range.start, req.range.end);

        let bars = with_timeout(self.price_timeout, fetch)
            .await
            .map_err(|err| AdvisorError::fetch("price", &err))?;

        tracing::debug!(ticker = %req.ticker, source, bars = bars.len(), "price series loaded");
        let series = PriceSeries::try_new(req.ticker.clone(), bars)?;
        series.within(req.range)
    }

    pub async fn load_sentiment(&self, ticker: &str) -> AdvisorResult<SentimentSummary> {
        let text = with_timeout(
            self.sentiment_timeout,
            self.sentiment.fetch_sentiment_summary(ticker),
        )
        .await
        .map_err(|err| AdvisorError::SentimentUnavailable {
            reason: format!("{err:#}"),
        })?;
        SentimentSummary::try_new(&text)
    }
}

async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => anyhow::bail!("timed out after {}s", limit.as_secs_f64()),
    }
}
