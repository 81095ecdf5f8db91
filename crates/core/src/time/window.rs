use crate::error::{AdvisorError, AdvisorResult};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_LOOKBACK_DAYS: u32 = 30;
pub const MAX_LOOKBACK_DAYS: u32 = 365;
pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;

/// Inclusive calendar-date range a price history is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AdvisorResult<Self> {
        if start > end {
            return Err(AdvisorError::invalid_request(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// `days` calendar days back from `end`.
    pub fn lookback(end: NaiveDate, days: u32) -> AdvisorResult<Self> {
        if !(MIN_LOOKBACK_DAYS..=MAX_LOOKBACK_DAYS).contains(&days) {
            return Err(AdvisorError::invalid_request(format!(
                "lookback must be {MIN_LOOKBACK_DAYS}..={MAX_LOOKBACK_DAYS} days (got {days})"
            )));
        }
        Self::new(end - Duration::days(i64::from(days)), end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Explicit `YYYY-MM-DD` argument wins; otherwise today's UTC date.
pub fn resolve_end_date(
    end_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = end_date_arg {
        return Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?);
    }
    Ok(now_utc.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn lookback_counts_calendar_days() {
        let end = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let range = DateRange::lookback(end, 30).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert!(range.contains(end));
        assert!(range.contains(range.start));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()));
    }

    #[test]
    fn lookback_rejects_out_of_range_days() {
        let end = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert!(DateRange::lookback(end, 29).is_err());
        assert!(DateRange::lookback(end, 366).is_err());
        assert!(DateRange::lookback(end, DEFAULT_LOOKBACK_DAYS).is_ok());
    }

    #[test]
    fn end_date_defaults_to_utc_today() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 23, 30, 0).unwrap();
        let d = resolve_end_date(None, now).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
    }

    #[test]
    fn end_date_argument_wins() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap();
        let d = resolve_end_date(Some("2025-12-31"), now).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert!(resolve_end_date(Some("31/12/2025"), now).is_err());
    }
}
