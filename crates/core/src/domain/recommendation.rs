use crate::domain::price::PriceBar;
use crate::time::DateRange;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Hold => "Hold",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either a decision, or the reason no decision could be made this run.
/// `NotComputed` is deliberately distinct from `Hold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationOutcome {
    Computed { recommendation: Recommendation },
    NotComputed { reason: String },
}

impl RecommendationOutcome {
    pub fn recommendation(&self) -> Option<Recommendation> {
        match self {
            Self::Computed { recommendation } => Some(*recommendation),
            Self::NotComputed { .. } => None,
        }
    }
}

impl fmt::Display for RecommendationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computed { recommendation } => write!(f, "{recommendation}"),
            Self::NotComputed { reason } => write!(f, "not computed ({reason})"),
        }
    }
}

/// Everything a front-end renders for one ticker and one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceReport {
    pub ticker: String,
    pub range: DateRange,
    pub generated_at: DateTime<Utc>,
    pub bars: usize,
    pub latest_price: f64,
    pub recent_performance: f64,
    pub recent_trend: i32,
    pub window_len: usize,
    pub sentiment_summary: Option<String>,
    pub sentiment_positive: Option<bool>,
    pub outcome: RecommendationOutcome,
    pub head: Vec<PriceBar>,
    pub tail: Vec<PriceBar>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_status_tag() {
        let computed = RecommendationOutcome::Computed {
            recommendation: Recommendation::Buy,
        };
        assert_eq!(
            serde_json::to_value(&computed).unwrap(),
            serde_json::json!({"status": "computed", "recommendation": "Buy"})
        );

        let missing = RecommendationOutcome::NotComputed {
            reason: "timeout".to_string(),
        };
        assert_eq!(missing.recommendation(), None);
        assert_eq!(missing.to_string(), "not computed (timeout)");
    }
}
