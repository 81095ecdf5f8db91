use crate::domain::price::PriceBar;
use chrono::NaiveDate;

pub mod file;
pub mod fixture;
pub mod http;
pub mod types;

/// Supplies daily bars for one ticker over an inclusive date range.
///
/// Implementations return bars sorted by date without duplicates. An empty vector is a
/// valid answer here; the caller decides that it is fatal.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch_price_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<PriceBar>>;
}
