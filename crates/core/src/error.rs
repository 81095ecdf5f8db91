use thiserror::Error;

/// Failure kinds surfaced by the advisor pipeline.
///
/// Collaborator plumbing reports `anyhow::Error`s; they are folded into `Fetch` or
/// `SentimentUnavailable` where the pipeline calls them. Nothing here is recovered
/// inside the core, the front-end decides what to show.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdvisorError {
    #[error("no price bars available for {ticker}")]
    EmptySeries { ticker: String },

    #[error("malformed price series: {detail}")]
    MalformedSeries { detail: String },

    #[error("sentiment unavailable: {reason}")]
    SentimentUnavailable { reason: String },

    #[error("{collaborator} fetch failed: {detail}")]
    Fetch {
        collaborator: &'static str,
        detail: String,
    },

    #[error("invalid request: {detail}")]
    InvalidRequest { detail: String },
}

pub type AdvisorResult<T> = Result<T, AdvisorError>;

impl AdvisorError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedSeries {
            detail: detail.into(),
        }
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::InvalidRequest {
            detail: detail.into(),
        }
    }

    /// Wraps a collaborator error, keeping the whole context chain in the detail.
    pub fn fetch(collaborator: &'static str, err: &anyhow::Error) -> Self {
        Self::Fetch {
            collaborator,
            detail: format!("{err:#}"),
        }
    }

    /// Stable snake_case name, used in logs and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptySeries { .. } => "empty_series",
            Self::MalformedSeries { .. } => "malformed_series",
            Self::SentimentUnavailable { .. } => "sentiment_unavailable",
            Self::Fetch { .. } => "fetch_error",
            Self::InvalidRequest { .. } => "invalid_request",
        }
    }
}
