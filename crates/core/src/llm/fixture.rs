use crate::llm::SentimentSource;
use std::time::Duration;

/// Canned sentiment replies for offline runs and tests.
#[derive(Debug, Clone)]
pub struct StaticSentimentSource {
    reply: Result<String, String>,
    delay: Option<Duration>,
}

impl StaticSentimentSource {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            delay: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            delay: None,
        }
    }

    /// Sleeps before answering; used to exercise caller timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait::async_trait]
impl SentimentSource for StaticSentimentSource {
    fn source_name(&self) -> &'static str {
        "static"
    }

    async fn fetch_sentiment_summary(&self, _ticker: &str) -> anyhow::Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone().map_err(anyhow::Error::msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn labels_itself_as_static() {
        let source = StaticSentimentSource::failing("offline");
        assert_eq!(source.source_name(), "static");
        assert!(source.fetch_sentiment_summary("AAPL").await.is_err());
    }
}
