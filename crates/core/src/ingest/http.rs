use crate::config::Settings;
use crate::domain::price::PriceBar;
use crate::ingest::types::DailyPricesResponse;
use crate::ingest::PriceSource;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PATH: &str = "/v1/daily_prices";

/// Market-data API returning `DailyPricesResponse` JSON. One attempt per call, no retry.
#[derive(Debug, Clone)]
pub struct HttpJsonPriceSource {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    path: String,
}

impl HttpJsonPriceSource {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        path: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build price provider http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
            path: path.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_data_provider_base_url()?.to_string();
        let api_key = settings.data_provider_api_key.clone();

        let timeout_secs = std::env::var("DATA_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let path = std::env::var("DATA_PROVIDER_PRICES_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        Self::new(base_url, api_key, path, Duration::from_secs(timeout_secs))
    }

    fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl PriceSource for HttpJsonPriceSource {
    fn source_name(&self) -> &'static str {
        "http_json"
    }

    async fn fetch_price_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let res = self
            .http
            .get(self.url())
            .headers(self.headers()?)
            .query(&[
                ("ticker", ticker.to_string()),
                ("start", start.to_string()),
                ("end", end.to_string()),
            ])
            .send()
            .await
            .context("price provider request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read price provider response")?;
        if !status.is_success() {
            anyhow::bail!("price provider HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<DailyPricesResponse>(&text)
            .with_context(|| format!("price provider response is not valid JSON: {text}"))?;
        validate(&parsed, ticker)?;
        Ok(parsed.bars)
    }
}

fn validate(resp: &DailyPricesResponse, expected_ticker: &str) -> Result<()> {
    anyhow::ensure!(
        resp.ticker.eq_ignore_ascii_case(expected_ticker),
        "price provider ticker mismatch: expected {expected_ticker}, got {}",
        resp.ticker
    );

    for pair in resp.bars.windows(2) {
        anyhow::ensure!(
            pair[0].date < pair[1].date,
            "price provider bars not sorted/deduplicated at {}",
            pair[1].date
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn source(base_url: String) -> HttpJsonPriceSource {
        HttpJsonPriceSource::new(base_url, Some("k".to_string()), DEFAULT_PATH, Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn fetches_bars_for_range() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "ticker": "AAPL",
            "bars": [
                {"date": "2026-01-05", "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5},
                {"date": "2026-01-06", "close": 1.6}
            ]
        });
        let mock = server
            .mock("GET", "/v1/daily_prices")
            .match_header("x-api-key", "k")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ticker".into(), "AAPL".into()),
                Matcher::UrlEncoded("start".into(), "2026-01-01".into()),
                Matcher::UrlEncoded("end".into(), "2026-01-31".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let bars = source(server.url())
            .fetch_price_series("AAPL", d(1), d(31))
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, d(5));
        assert_eq!(bars[1].open, None);
        assert_eq!(bars[1].close, Some(1.6));
    }

    #[tokio::test]
    async fn surfaces_http_errors_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/daily_prices")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("down")
            .expect(1)
            .create_async()
            .await;

        let err = source(server.url())
            .fetch_price_series("AAPL", d(1), d(31))
            .await
            .unwrap_err();
        mock.assert_async().await;
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn rejects_unsorted_or_foreign_payloads() {
        let unsorted = DailyPricesResponse {
            ticker: "AAPL".to_string(),
            bars: vec![PriceBar::close_only(d(6), 1.0), PriceBar::close_only(d(5), 1.0)],
        };
        assert!(validate(&unsorted, "AAPL").is_err());

        let foreign = DailyPricesResponse {
            ticker: "TSLA".to_string(),
            bars: vec![],
        };
        assert!(validate(&foreign, "AAPL").is_err());
        assert!(validate(&foreign, "tsla").is_ok());
    }

    #[test]
    fn url_joins_base_and_path() {
        let s = HttpJsonPriceSource::new("http://x/", None, "v2/prices", Duration::from_secs(1)).unwrap();
        assert_eq!(s.url(), "http://x/v2/prices");
    }
}
