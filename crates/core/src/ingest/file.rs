use crate::domain::price::PriceBar;
use crate::ingest::PriceSource;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Reads `<data_dir>/<TICKER>.csv`, a spreadsheet export with `Date` and `Close`
/// columns (`Open`, `High`, `Low` optional, anything else ignored).
#[derive(Debug, Clone)]
pub struct CsvFilePriceSource {
    data_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open", default)]
    open: Option<f64>,
    #[serde(rename = "High", default)]
    high: Option<f64>,
    #[serde(rename = "Low", default)]
    low: Option<f64>,
    #[serde(rename = "Close")]
    close: Option<f64>,
}

impl CsvFilePriceSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(format!("{ticker}.csv"))
    }
}

#[async_trait::async_trait]
impl PriceSource for CsvFilePriceSource {
    fn source_name(&self) -> &'static str {
        "csv_file"
    }

    async fn fetch_price_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let path = self.path_for(ticker);
        anyhow::ensure!(
            path.exists(),
            "no local price file for {ticker} at {}",
            path.display()
        );

        let bars = tokio::task::spawn_blocking(move || load_bars(&path))
            .await
            .context("join csv load task failed")??;

        Ok(bars
            .into_iter()
            .filter(|b| start <= b.date && b.date <= end)
            .collect())
    }
}

fn load_bars(path: &Path) -> Result<Vec<PriceBar>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut bars = Vec::new();
    for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
        // +2: header line, then 1-based rows.
        let line = idx + 2;
        let row = row.with_context(|| format!("{}:{line}: bad row", path.display()))?;
        let date = parse_date(&row.date)
            .with_context(|| format!("{}:{line}: bad Date {:?}", path.display(), row.date))?;
        bars.push(PriceBar {
            date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
        });
    }

    bars.sort_by_key(|b| b.date);
    for pair in bars.windows(2) {
        anyhow::ensure!(
            pair[0].date != pair[1].date,
            "{}: duplicate date {}",
            path.display(),
            pair[1].date
        );
    }
    Ok(bars)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part as spreadsheets export it.
fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let day = s.get(..10).unwrap_or(s);
    Ok(NaiveDate::parse_from_str(day, "%Y-%m-%d")?)
}
