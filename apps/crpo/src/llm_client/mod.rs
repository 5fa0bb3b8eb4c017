//! LLM Client: the single point of entry for all chat-completion calls in the harness.
//!
//! ARCHITECTURAL RULE: No other module may call the Groq API directly.
//! Evaluation and optimization both go through this module.
//!
//! Talks to the OpenAI-compatible `/chat/completions` endpoint that Groq exposes.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Sampling parameters for a single completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionParams {
    /// Answering a benchmark question under a candidate template.
    pub const EVALUATION: Self = Self::new(0.3, 200);
    /// Contrastive rationale for a single domain.
    pub const SINGLE_DOMAIN_REASONING: Self = Self::new(0.7, 300);
    /// Template synthesis for a single domain.
    pub const SINGLE_DOMAIN_GENERATION: Self = Self::new(0.3, 200);
    /// Contrastive rationale across all domains.
    pub const MULTI_DOMAIN_REASONING: Self = Self::new(0.7, 400);
    /// Template synthesis across all domains.
    pub const MULTI_DOMAIN_GENERATION: Self = Self::new(0.3, 250);
    /// Connectivity check.
    pub const PING: Self = Self::new(0.7, 100);

    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single LLM client used by evaluators and optimizers.
/// Clones share the HTTP connection pool and the API call counter.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry_base_delay: Duration,
    api_calls: Arc<AtomicU64>,
}

impl LlmClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            api_calls: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Overrides the first backoff step; later steps double it.
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Successful completions made through this client and all of its clones.
    pub fn api_calls(&self) -> u64 {
        self.api_calls.load(Ordering::Relaxed)
    }

    /// Makes a raw call to the chat-completions API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(
        &self,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.retry_base_delay * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let chat_response: ChatResponse = serde_json::from_str(&body)?;
            self.api_calls.fetch_add(1, Ordering::Relaxed);

            if let Some(usage) = &chat_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(chat_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Convenience method returning only the completion text.
    pub async fn complete(
        &self,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<String, LlmError> {
        let response = self.call(prompt, params).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{completion_body, mock_client};
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_returns_first_choice_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "max_tokens": 200,
                "messages": [{"role": "user", "content": "What is 2+2?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("4")))
            .mount(&server)
            .await;

        let llm = mock_client(&server);
        let text = llm
            .complete("What is 2+2?", CompletionParams::EVALUATION)
            .await
            .unwrap();
        assert_eq!(text, "4");
        assert_eq!(llm.api_calls(), 1);
    }

    #[tokio::test]
    async fn test_counter_is_shared_between_clones() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .mount(&server)
            .await;

        let llm = mock_client(&server);
        let clone = llm.clone();
        llm.complete("a", CompletionParams::PING).await.unwrap();
        clone.complete("b", CompletionParams::PING).await.unwrap();
        assert_eq!(llm.api_calls(), 2);
        assert_eq!(clone.api_calls(), 2);
    }

    #[tokio::test]
    async fn test_retries_on_server_error_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("recovered")))
            .mount(&server)
            .await;

        let llm = mock_client(&server);
        let text = llm.complete("q", CompletionParams::EVALUATION).await.unwrap();
        assert_eq!(text, "recovered");
        assert_eq!(llm.api_calls(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_exhausts_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(3)
            .mount(&server)
            .await;

        let llm = mock_client(&server);
        let err = llm
            .complete("q", CompletionParams::EVALUATION)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 429, .. }));
        assert_eq!(llm.api_calls(), 0);
    }

    #[tokio::test]
    async fn test_client_error_surfaces_api_message_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let llm = mock_client(&server);
        let err = llm
            .complete("q", CompletionParams::EVALUATION)
            .await
            .unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_null_content_is_empty_content_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": null}}]
            })))
            .mount(&server)
            .await;

        let llm = mock_client(&server);
        let err = llm
            .complete("q", CompletionParams::EVALUATION)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[test]
    fn test_param_presets() {
        assert_eq!(CompletionParams::EVALUATION, CompletionParams::new(0.3, 200));
        assert_eq!(CompletionParams::MULTI_DOMAIN_REASONING.max_tokens, 400);
        assert_eq!(CompletionParams::MULTI_DOMAIN_GENERATION.max_tokens, 250);
    }
}
