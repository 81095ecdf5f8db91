use crate::error::{AdvisorError, AdvisorResult};
use crate::time::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLC bar. Only `close` is read by the signal engine; a missing close is
/// kept as `None` so the engine can reject it instead of the loader guessing a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    pub close: Option<f64>,
}

impl PriceBar {
    pub fn close_only(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: Some(close),
        }
    }
}

/// Chronological daily bars for a single ticker.
///
/// Always holds at least one bar and strictly increasing dates. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn try_new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> AdvisorResult<Self> {
        let ticker = ticker.into();
        if bars.is_empty() {
            return Err(AdvisorError::EmptySeries { ticker });
        }

        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(AdvisorError::malformed(format!(
                    "dates must be strictly increasing ({} followed by {})",
                    pair[0].date, pair[1].date
                )));
            }
        }

        Ok(Self { ticker, bars })
    }

    /// Sorts by date before validating. Duplicate dates are still rejected.
    pub fn from_unsorted(ticker: impl Into<String>, mut bars: Vec<PriceBar>) -> AdvisorResult<Self> {
        bars.sort_by_key(|b| b.date);
        Self::try_new(ticker, bars)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    // Never true for a constructed series; kept alongside `len` for clippy.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    pub fn latest(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn head(&self, n: usize) -> &[PriceBar] {
        &self.bars[..n.min(self.bars.len())]
    }

    pub fn tail(&self, n: usize) -> &[PriceBar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }

    /// Restricts the series to bars inside `range` (inclusive on both ends).
    pub fn within(&self, range: DateRange) -> AdvisorResult<Self> {
        let bars = self
            .bars
            .iter()
            .filter(|b| range.contains(b.date))
            .cloned()
            .collect();
        Self::try_new(self.ticker.clone(), bars)
    }

    /// Close prices, failing on the first missing or non-finite value.
    pub fn closes(&self) -> AdvisorResult<Vec<f64>> {
        self.bars
            .iter()
            .map(|b| match b.close {
                Some(c) if c.is_finite() => Ok(c),
                Some(c) => Err(AdvisorError::malformed(format!(
                    "non-finite close {c} on {}",
                    b.date
                ))),
                None => Err(AdvisorError::malformed(format!("missing close on {}", b.date))),
            })
            .collect()
    }

    /// Daily fractional returns, one per bar after the first.
    pub fn returns(&self) -> AdvisorResult<Vec<f64>> {
        let closes = self.closes()?;
        let mut out = Vec::with_capacity(closes.len().saturating_sub(1));
        for (i, pair) in closes.windows(2).enumerate() {
            let ret = pair[1] / pair[0] - 1.0;
            if !ret.is_finite() {
                return Err(AdvisorError::malformed(format!(
                    "return on {} is not finite (previous close {})",
                    self.bars[i + 1].date,
                    pair[0]
                )));
            }
            out.push(ret);
        }
        Ok(out)
    }
}
