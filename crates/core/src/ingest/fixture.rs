use crate::domain::price::PriceBar;
use crate::ingest::PriceSource;
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::time::Duration;

/// Price source backed by bars held in memory. Unknown tickers yield no bars.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceSource {
    series: BTreeMap<String, Vec<PriceBar>>,
    delay: Option<Duration>,
}

impl InMemoryPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, ticker: &str, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        self.series.insert(ticker.to_ascii_uppercase(), bars);
        self
    }

    /// Consecutive daily bars starting at `start`, one per close.
    pub fn with_closes(self, ticker: &str, start: NaiveDate, closes: &[f64]) -> Self {
        let bars = closes
            .iter()
            .zip(start.iter_days())
            .map(|(close, date)| PriceBar::close_only(date, *close))
            .collect();
        self.with_series(ticker, bars)
    }

    /// Sleeps before answering; used to exercise caller timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait::async_trait]
impl PriceSource for InMemoryPriceSource {
    fn source_name(&self) -> &'static str {
        "in_memory"
    }

    async fn fetch_price_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .series
            .get(&ticker.to_ascii_uppercase())
            .map(|bars| {
                bars.iter()
                    .filter(|b| start <= b.date && b.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
