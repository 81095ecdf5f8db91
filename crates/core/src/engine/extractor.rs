use crate::domain::price::PriceSeries;
use crate::error::{AdvisorError, AdvisorResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RECENCY_WINDOW: usize = 5;

/// Numeric features read off the trailing window of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalFeatures {
    /// Mean daily return over the window.
    pub recent_performance: f64,
    /// Up-days minus down-days over the window.
    pub recent_trend: i32,
    /// Close of the most recent bar. Display only.
    pub latest_price: f64,
    /// Number of returns the window actually covered.
    pub window_len: usize,
}

/// `+1` for a strictly positive return, `-1` otherwise (a flat day counts as down).
pub fn return_signal(ret: f64) -> i32 {
    if ret > 0.0 {
        1
    } else {
        -1
    }
}

pub fn extract_signal(series: &PriceSeries) -> AdvisorResult<SignalFeatures> {
    extract_signal_with_window(series, DEFAULT_RECENCY_WINDOW)
}

/// Features over the last `min(window, n - 1)` returns of `series`.
pub fn extract_signal_with_window(
    series: &PriceSeries,
    window: usize,
) -> AdvisorResult<SignalFeatures> {
    if window == 0 {
        return Err(AdvisorError::invalid_request("recency window must be at least 1"));
    }
    if series.len() < 2 {
        return Err(AdvisorError::malformed(format!(
            "need at least 2 bars to compute a return (got {})",
            series.len()
        )));
    }

    let closes = series.closes()?;
    let returns = series.returns()?;
    let recent = &returns[returns.len().saturating_sub(window)..];

    let recent_performance = recent.iter().sum::<f64>() / recent.len() as f64;
    let recent_trend: i32 = recent.iter().map(|r| return_signal(*r)).sum();

    Ok(SignalFeatures {
        recent_performance,
        recent_trend,
        latest_price: closes[closes.len() - 1],
        window_len: recent.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PriceBar;
    use chrono::{Duration, NaiveDate};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, c)| PriceBar::close_only(start + Duration::days(i as i64), *c))
            .collect();
        PriceSeries::try_new("NVDA", bars).unwrap()
    }

    #[test]
    fn uses_last_five_returns() {
        // 7 bars -> 6 returns; the first return (100 -> 200) must fall outside the window.
        let s = series(&[100.0, 200.0, 202.0, 200.0, 204.0, 204.0, 206.04]);
        let f = extract_signal(&s).unwrap();

        let expected = [0.01, 200.0 / 202.0 - 1.0, 0.02, 0.0, 0.01];
        let mean = expected.iter().sum::<f64>() / 5.0;
        assert_eq!(f.window_len, 5);
        assert!((f.recent_performance - mean).abs() < 1e-12);
        // up, down, up, flat(-1), up
        assert_eq!(f.recent_trend, 1);
        assert_eq!(f.latest_price, 206.04);
    }

    #[test]
    fn short_series_uses_all_returns() {
        let s = series(&[10.0, 11.0, 9.9]);
        let f = extract_signal(&s).unwrap();
        assert_eq!(f.window_len, 2);
        assert!((f.recent_performance - 0.0).abs() < 1e-12);
        assert_eq!(f.recent_trend, 0);
    }

    #[test]
    fn flat_day_counts_as_down() {
        let s = series(&[5.0, 5.0, 5.0]);
        let f = extract_signal(&s).unwrap();
        assert_eq!(f.recent_performance, 0.0);
        assert_eq!(f.recent_trend, -2);
        assert_eq!(return_signal(0.0), -1);
    }

    #[test]
    fn single_bar_is_rejected() {
        let s = series(&[42.0]);
        assert!(matches!(
            extract_signal(&s),
            Err(AdvisorError::MalformedSeries { .. })
        ));
    }

    #[test]
    fn missing_close_fails_fast() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let mut bars: Vec<_> = (0..4)
            .map(|i| PriceBar::close_only(start + Duration::days(i), 10.0 + i as f64))
            .collect();
        bars[0].close = None;
        let s = PriceSeries::try_new("NVDA", bars).unwrap();
        assert!(matches!(
            extract_signal(&s),
            Err(AdvisorError::MalformedSeries { .. })
        ));
    }

    #[test]
    fn custom_window() {
        let s = series(&[100.0, 90.0, 99.0]);
        let f = extract_signal_with_window(&s, 1).unwrap();
        assert_eq!(f.window_len, 1);
        assert!((f.recent_performance - 0.1).abs() < 1e-12);
        assert_eq!(f.recent_trend, 1);
        assert!(extract_signal_with_window(&s, 0).is_err());
    }
}
