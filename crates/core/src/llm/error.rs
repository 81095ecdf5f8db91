use crate::llm::Provider;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Non-2xx from the provider.
    Http,
    /// 2xx, but no usable text in the reply.
    EmptyResponse,
}

impl FailureStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::EmptyResponse => "empty_response",
        }
    }
}

/// Sentiment provider failure. Keeps the raw body for the logs.
#[derive(Debug, Clone, thiserror::Error)]
#[error("sentiment provider {provider} failed at {}: {detail}", stage.as_str())]
pub struct SentimentFetchError {
    pub provider: Provider,
    pub stage: FailureStage,
    pub detail: String,
    pub raw_body: Option<String>,
    pub raw_json: Option<Value>,
}

impl SentimentFetchError {
    pub fn http(provider: Provider, status: reqwest::StatusCode, body: String) -> Self {
        Self {
            provider,
            stage: FailureStage::Http,
            detail: format!("status={status}"),
            raw_json: serde_json::from_str(&body).ok(),
            raw_body: Some(body),
        }
    }

    pub fn empty(provider: Provider, detail: &str, raw_json: Value) -> Self {
        Self {
            provider,
            stage: FailureStage::EmptyResponse,
            detail: detail.to_string(),
            raw_body: None,
            raw_json: Some(raw_json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_failure_keeps_parsed_body() {
        let err = SentimentFetchError::http(
            Provider::OpenAI,
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":"rate limited"}"#.to_string(),
        );
        assert_eq!(err.stage, FailureStage::Http);
        assert_eq!(err.raw_json.as_ref().unwrap()["error"], "rate limited");
        assert!(err.to_string().contains("at http: status=429"));
    }
}
