use crate::config::Settings;
use crate::llm::error::SentimentFetchError;
use crate::llm::{prompts, read_reply, Endpoint, Provider, SentimentSource};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    headers: HeaderMap,
    endpoint: Endpoint,
}

impl AnthropicClient {
    pub fn new(api_key: &str, endpoint: Endpoint) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).context("ANTHROPIC_API_KEY is not a valid header")?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        Ok(Self {
            http: endpoint.http_client()?,
            headers,
            endpoint,
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(
            settings.require_anthropic_api_key()?,
            Endpoint::from_env("ANTHROPIC", DEFAULT_BASE_URL, DEFAULT_MODEL),
        )
    }

    async fn create_message(
        &self,
        req: CreateMessageRequest<'_>,
    ) -> anyhow::Result<(serde_json::Value, CreateMessageResponse)> {
        let res = self
            .http
            .post(self.endpoint.url("/v1/messages"))
            .headers(self.headers.clone())
            .json(&req)
            .send()
            .await
            .context("Anthropic request failed")?;
        read_reply(Provider::Anthropic, res).await
    }

    /// Text blocks joined by newlines. Thinking and tool blocks are dropped.
    fn response_text(res: &CreateMessageResponse) -> String {
        res.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait::async_trait]
impl SentimentSource for AnthropicClient {
    fn source_name(&self) -> &'static str {
        Provider::Anthropic.as_str()
    }

    async fn fetch_sentiment_summary(&self, ticker: &str) -> anyhow::Result<String> {
        let user = prompts::user_prompt(ticker);
        let req = CreateMessageRequest {
            model: &self.endpoint.model,
            max_tokens: self.endpoint.max_tokens,
            system: prompts::SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: &user,
            }],
        };

        let (raw_json, res) = self.create_message(req).await?;
        if res.stop_reason.as_deref() == Some("max_tokens") {
            tracing::warn!(
                ticker,
                max_tokens = self.endpoint.max_tokens,
                "sentiment summary truncated at max_tokens"
            );
        }

        let text = Self::response_text(&res);
        let text = text.trim();
        if text.is_empty() {
            return Err(
                SentimentFetchError::empty(Provider::Anthropic, "no text content blocks", raw_json)
                    .into(),
            );
        }
        Ok(text.to_string())
    }
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::error::FailureStage;
    use mockito::Matcher;
    use serde_json::json;

    fn client(base_url: String) -> AnthropicClient {
        let mut endpoint = Endpoint::new(base_url, DEFAULT_MODEL);
        endpoint.timeout = std::time::Duration::from_secs(5);
        AnthropicClient::new("ak-test", endpoint).unwrap()
    }

    #[test]
    fn joins_text_blocks_and_skips_others() {
        let res: CreateMessageResponse = serde_json::from_value(json!({
            "content": [
                {"type": "thinking", "thinking": "hmm", "signature": "x"},
                {"type": "text", "text": "Sentiment is positive."},
                {"type": "tool_use", "id": "t", "name": "n", "input": {}},
                {"type": "text", "text": "Impact: moderate."}
            ],
            "stop_reason": "end_turn"
        }))
        .unwrap();
        assert_eq!(
            AnthropicClient::response_text(&res),
            "Sentiment is positive.\nImpact: moderate."
        );
    }

    #[tokio::test]
    async fn fetches_summary_with_system_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "ak-test")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .match_body(Matcher::PartialJson(json!({
                "system": "You are a financial analyst.",
                "max_tokens": 500
            })))
            .with_status(200)
            .with_body(
                json!({
                    "content": [{"type": "text", "text": "Negative tone overall."}],
                    "stop_reason": "end_turn"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let text = client(server.url())
            .fetch_sentiment_summary("AMZN")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(text, "Negative tone overall.");
    }

    #[tokio::test]
    async fn empty_content_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(r#"{"content":[]}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .fetch_sentiment_summary("AMZN")
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<SentimentFetchError>().unwrap().stage,
            FailureStage::EmptyResponse
        );
    }
}
