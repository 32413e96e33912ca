use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::ProviderError;
use crate::core::model::ModelId;
use crate::core::provider::ChatGateway;

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 1000;
const MAX_BACKOFF_MS: u64 = 60_000;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [RequestMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// How many times a failed request is repeated and how long to wait first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
        }
    }

    /// Exponential backoff: `initial_delay * 2^(attempt - 1)`, capped at 60s.
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let initial = self.initial_delay.as_millis() as u64;
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        initial.saturating_mul(factor).min(MAX_BACKOFF_MS)
    }

    /// Wait before retry number `attempt`: the server's `Retry-After` when
    /// given, the backoff otherwise, never more than 60s.
    pub fn wait_ms(&self, err: &ProviderError, attempt: u32) -> u64 {
        match err {
            ProviderError::RateLimited {
                retry_after_ms: Some(ms),
                ..
            } => (*ms).min(MAX_BACKOFF_MS),
            _ => self.backoff_ms(attempt),
        }
    }
}

/// Gateway speaking the OpenAI `chat/completions` dialect.
pub struct OpenAiGateway {
    client: Client,
    api_key: String,
    model: ModelId,
    base_url: String,
    system_instruction: String,
    retry: RetryPolicy,
}

impl OpenAiGateway {
    pub fn new(
        api_key: String,
        model: ModelId,
        base_url: String,
        system_instruction: String,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url,
            system_instruction,
            retry,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_request<'a>(&'a self, message: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model.0,
            messages: [
                RequestMessage {
                    role: "system",
                    content: &self.system_instruction,
                },
                RequestMessage {
                    role: "user",
                    content: message,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }

    async fn send_once(
        &self,
        url: &str,
        body: &ChatCompletionRequest<'_>,
    ) -> Result<String, ProviderError> {
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            let text = resp
                .text()
                .await
                .map_err(|e| ProviderError::Http(e.to_string()))?;
            return parse_reply(&text);
        }

        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        let text = resp.text().await.unwrap_or_default();
        let status = status.as_u16();
        let message = api_error_message(&text);
        if matches!(status, 429 | 502 | 503) {
            return Err(ProviderError::RateLimited {
                status,
                message,
                retry_after_ms: retry_after,
            });
        }

        Err(ProviderError::Api { status, message })
    }
}

#[async_trait]
impl ChatGateway for OpenAiGateway {
    async fn send(&self, message: &str) -> Result<String, ProviderError> {
        let url = self.endpoint();
        let body = self.build_request(message);
        tracing::debug!(model = %self.model, url = %url, chars = message.len(), "sending chat completion");

        let mut attempt = 0;
        loop {
            match self.send_once(&url, &body).await {
                Ok(reply) => {
                    tracing::debug!(model = %self.model, chars = reply.len(), "chat completion received");
                    return Ok(reply);
                }
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let wait_ms = self.retry.wait_ms(&err, attempt);
                    tracing::warn!(
                        error = %err,
                        attempt,
                        max_retries = self.retry.max_retries,
                        wait_ms,
                        "chat completion failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                }
                Err(err) => {
                    tracing::warn!(error = %err, model = %self.model, "chat completion failed");
                    return Err(err.into_final());
                }
            }
        }
    }

    fn model(&self) -> &ModelId {
        &self.model
    }
}

/// `Retry-After` in whole seconds, as milliseconds. HTTP-date values are
/// ignored and fall back to the backoff.
fn parse_retry_after(value: &str) -> Option<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}

/// Extract `choices[0].message.content` from a response body.
fn parse_reply(body: &str) -> Result<String, ProviderError> {
    let resp: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".into()))?;
    choice
        .message
        .content
        .ok_or_else(|| ProviderError::InvalidResponse("No content in first choice".into()))
}

/// Prefer the `error.message` field of an OpenAI-style error body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
