//! Anthropic Messages API client (non-streaming).

pub mod convert;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error_parsing::error_for_status;
use crate::provider::{LlmClient, LlmRequest, LlmResponse, ProviderError, ProviderResult};
use crate::retry::RetryPolicy;

use self::convert::{BodyOptions, parse_response, request_body};

const API_VERSION: &str = "2023-06-01";

/// Connection settings for [`AnthropicClient`].
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API key sent as `x-api-key`.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Output token cap per request.
    pub max_tokens: u32,
    /// Computer-use tool version.
    pub computer_tool_type: String,
    /// `anthropic-beta` header value; empty to omit.
    pub beta: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries for transient failures.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("computer_tool_type", &self.computer_tool_type)
            .field("beta", &self.beta)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Reference [`LlmClient`] for Anthropic models.
pub struct AnthropicClient {
    config: AnthropicConfig,
    http: reqwest::Client,
}

impl AnthropicClient {
    /// Build a client. Fails only if the HTTP client cannot be constructed
    /// or the key is not a valid header value.
    pub fn new(config: AnthropicConfig) -> ProviderResult<Self> {
        let headers = build_headers(&config)?;
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }
}

fn build_headers(config: &AnthropicConfig) -> ProviderResult<HeaderMap> {
    let invalid = |what: &str| ProviderError::Auth {
        message: format!("{what} is not a valid header value"),
    };
    let mut headers = HeaderMap::new();
    let _ = headers.insert(
        "x-api-key",
        HeaderValue::from_str(&config.api_key).map_err(|_| invalid("API key"))?,
    );
    let _ = headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
    if !config.beta.is_empty() {
        let _ = headers.insert(
            "anthropic-beta",
            HeaderValue::from_str(&config.beta).map_err(|_| invalid("beta flag"))?,
        );
    }
    Ok(headers)
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip_all, fields(model = %self.config.model, messages = request.messages.len()))]
    async fn complete(&self, request: LlmRequest<'_>) -> ProviderResult<LlmResponse> {
        let body = request_body(
            &request,
            &BodyOptions {
                model: &self.config.model,
                max_tokens: self.config.max_tokens,
                computer_tool_type: &self.config.computer_tool_type,
            },
        );

        let mut attempt = 0;
        loop {
            match self.send(&body).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    attempt += 1;
                    let Some(delay) = self.config.retry.next_delay(&err, attempt) else {
                        return Err(err);
                    };
                    warn!(
                        attempt,
                        max_retries = self.config.retry.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        category = err.category(),
                        error = %err,
                        "retrying anthropic request"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl AnthropicClient {
    async fn send(&self, body: &Value) -> ProviderResult<LlmResponse> {
        let response = self.http.post(self.endpoint()).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body_text = response.text().await.unwrap_or_default();
            let err = error_for_status(status.as_u16(), &body_text, retry_after);
            debug!(status = status.as_u16(), category = err.category(), "anthropic request failed");
            return Err(err);
        }

        let json: Value = response.json().await?;
        parse_response(&json)
    }
}
