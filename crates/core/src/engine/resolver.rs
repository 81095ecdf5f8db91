use crate::domain::recommendation::Recommendation;
use crate::engine::extractor::{SignalFeatures, DEFAULT_RECENCY_WINDOW};
use crate::error::{AdvisorError, AdvisorResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BUY_PERFORMANCE_THRESHOLD: f64 = 0.005;
pub const DEFAULT_SELL_TREND_THRESHOLD: i32 = -2;

/// Threshold policy for turning features into a recommendation.
///
/// Rules, in order:
/// 1. performance strictly above `buy_performance_threshold` with positive sentiment: Buy
/// 2. trend strictly below `sell_trend_threshold`: Sell
/// 3. otherwise: Hold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    pub buy_performance_threshold: f64,
    pub sell_trend_threshold: i32,
    pub recency_window: usize,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            buy_performance_threshold: DEFAULT_BUY_PERFORMANCE_THRESHOLD,
            sell_trend_threshold: DEFAULT_SELL_TREND_THRESHOLD,
            recency_window: DEFAULT_RECENCY_WINDOW,
        }
    }
}

impl DecisionPolicy {
    pub fn validate(&self) -> AdvisorResult<()> {
        if !self.buy_performance_threshold.is_finite() {
            return Err(AdvisorError::invalid_request(format!(
                "buy performance threshold must be finite (got {})",
                self.buy_performance_threshold
            )));
        }
        if self.recency_window == 0 {
            return Err(AdvisorError::invalid_request("recency window must be at least 1"));
        }
        Ok(())
    }

    pub fn resolve(
        &self,
        recent_performance: f64,
        recent_trend: i32,
        sentiment_positive: bool,
    ) -> Recommendation {
        if recent_performance > self.buy_performance_threshold && sentiment_positive {
            Recommendation::Buy
        } else if recent_trend < self.sell_trend_threshold {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        }
    }

    pub fn resolve_features(
        &self,
        features: &SignalFeatures,
        sentiment_positive: bool,
    ) -> Recommendation {
        self.resolve(
            features.recent_performance,
            features.recent_trend,
            sentiment_positive,
        )
    }
}

/// Resolves with the default thresholds.
pub fn resolve_recommendation(
    recent_performance: f64,
    recent_trend: i32,
    sentiment_positive: bool,
) -> Recommendation {
    DecisionPolicy::default().resolve(recent_performance, recent_trend, sentiment_positive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_takes_precedence_over_sell() {
        assert_eq!(resolve_recommendation(0.01, -5, true), Recommendation::Buy);
    }

    #[test]
    fn buy_threshold_is_strict() {
        assert_eq!(resolve_recommendation(0.005, 0, true), Recommendation::Hold);
        assert_eq!(resolve_recommendation(0.0051, 0, true), Recommendation::Buy);
    }

    #[test]
    fn buy_needs_positive_sentiment() {
        assert_eq!(resolve_recommendation(0.05, 0, false), Recommendation::Hold);
        assert_eq!(resolve_recommendation(0.05, -3, false), Recommendation::Sell);
    }

    #[test]
    fn sell_threshold_is_strict() {
        assert_eq!(resolve_recommendation(-0.01, -3, false), Recommendation::Sell);
        assert_eq!(resolve_recommendation(-0.01, -2, false), Recommendation::Hold);
    }

    #[test]
    fn defaults_to_hold() {
        assert_eq!(resolve_recommendation(0.001, 0, false), Recommendation::Hold);
    }

    #[test]
    fn resolution_is_repeatable() {
        let policy = DecisionPolicy::default();
        let first = policy.resolve(0.02, -4, true);
        for _ in 0..3 {
            assert_eq!(policy.resolve(0.02, -4, true), first);
        }
        assert_eq!(policy, DecisionPolicy::default());
    }

    #[test]
    fn tuned_thresholds_apply() {
        let policy = DecisionPolicy {
            buy_performance_threshold: 0.02,
            sell_trend_threshold: 0,
            recency_window: 3,
        };
        assert_eq!(policy.resolve(0.01, 1, true), Recommendation::Hold);
        assert_eq!(policy.resolve(0.01, -1, true), Recommendation::Sell);
        assert_eq!(policy.resolve(0.03, -1, true), Recommendation::Buy);
    }

    #[test]
    fn validate_rejects_zero_window_and_nan() {
        let mut policy = DecisionPolicy::default();
        assert!(policy.validate().is_ok());
        policy.recency_window = 0;
        assert!(policy.validate().is_err());

        let nan = DecisionPolicy {
            buy_performance_threshold: f64::NAN,
            ..DecisionPolicy::default()
        };
        assert!(nan.validate().is_err());
    }
}
