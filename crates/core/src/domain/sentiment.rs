use crate::error::{AdvisorError, AdvisorResult};
use serde::{Deserialize, Serialize};

const POSITIVE_MARKER: &str = "positive";

/// Case-insensitive substring check for "positive".
///
/// "Not positive" still classifies as positive; the sentiment text is opaque and only
/// this marker is inspected.
pub fn classify_sentiment(text: &str) -> bool {
    text.to_lowercase().contains(POSITIVE_MARKER)
}

/// Sentiment text exactly as the language model returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentSummary(String);

impl SentimentSummary {
    /// Whitespace-only text counts as no sentiment at all. Anything else is kept whole.
    pub fn try_new(raw: &str) -> AdvisorResult<Self> {
        if raw.trim().is_empty() {
            return Err(AdvisorError::SentimentUnavailable {
                reason: "sentiment source returned empty text".to_string(),
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_positive(&self) -> bool {
        classify_sentiment(&self.0)
    }
}
