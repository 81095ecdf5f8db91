use crate::config::Settings;
use crate::llm::error::SentimentFetchError;
use crate::llm::{prompts, read_reply, Endpoint, Provider, SentimentSource};
use anyhow::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "openai/gpt-4o";

/// Client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: Endpoint,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, endpoint: Endpoint) -> anyhow::Result<Self> {
        Ok(Self {
            http: endpoint.http_client()?,
            api_key: api_key.into(),
            endpoint,
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?;
        Self::new(
            api_key,
            Endpoint::from_env("OPENAI", DEFAULT_BASE_URL, DEFAULT_MODEL),
        )
    }

    async fn create_completion(
        &self,
        req: ChatCompletionRequest<'_>,
    ) -> anyhow::Result<(serde_json::Value, ChatCompletionResponse)> {
        let res = self
            .http
            .post(self.endpoint.url("/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("chat completion request failed")?;
        read_reply(Provider::OpenAI, res).await
    }

    fn first_choice_text(res: &ChatCompletionResponse) -> Option<&str> {
        res.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[async_trait::async_trait]
impl SentimentSource for OpenAiClient {
    fn source_name(&self) -> &'static str {
        Provider::OpenAI.as_str()
    }

    async fn fetch_sentiment_summary(&self, ticker: &str) -> anyhow::Result<String> {
        let user = prompts::user_prompt(ticker);
        let req = ChatCompletionRequest {
            model: &self.endpoint.model,
            max_tokens: self.endpoint.max_tokens,
            messages: vec![
                Message {
                    role: "system",
                    content: prompts::SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: &user,
                },
            ],
        };

        let (raw_json, res) = self.create_completion(req).await?;
        if let Some(choice) = res.choices.first() {
            if choice.finish_reason.as_deref() == Some("length") {
                tracing::warn!(
                    ticker,
                    max_tokens = self.endpoint.max_tokens,
                    "sentiment summary truncated at max_tokens"
                );
            }
        }

        match Self::first_choice_text(&res) {
            Some(text) => Ok(text.to_string()),
            None => Err(SentimentFetchError::empty(
                Provider::OpenAI,
                "no message content in first choice",
                raw_json,
            )
            .into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Clone, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::error::FailureStage;
    use mockito::Matcher;
    use serde_json::json;

    fn client(base_url: String) -> OpenAiClient {
        let mut endpoint = Endpoint::new(base_url, DEFAULT_MODEL);
        endpoint.timeout = std::time::Duration::from_secs(5);
        OpenAiClient::new("sk-test", endpoint).unwrap()
    }

    #[tokio::test]
    async fn sends_analyst_prompt_and_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "openai/gpt-4o",
                "max_tokens": 500,
                "messages": [
                    {"role": "system", "content": "You are a financial analyst."},
                    {"role": "user", "content": prompts::user_prompt("AAPL")}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "  Overall positive sentiment. "}, "finish_reason": "stop"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let text = client(server.url())
            .fetch_sentiment_summary("AAPL")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(text, "Overall positive sentiment.");
    }

    #[tokio::test]
    async fn non_success_status_carries_diagnostics() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"bad key"}}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .fetch_sentiment_summary("AAPL")
            .await
            .unwrap_err();
        let diag = err.downcast_ref::<SentimentFetchError>().unwrap();
        assert_eq!(diag.stage, FailureStage::Http);
        assert_eq!(
            diag.raw_json,
            Some(json!({"error": {"message": "bad key"}}))
        );
    }

    #[tokio::test]
    async fn empty_content_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":null}}]}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .fetch_sentiment_summary("AAPL")
            .await
            .unwrap_err();
        let diag = err.downcast_ref::<SentimentFetchError>().unwrap();
        assert_eq!(diag.stage, FailureStage::EmptyResponse);
    }
}
