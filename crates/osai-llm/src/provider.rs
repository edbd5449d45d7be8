//! `LlmClient` trait and the request/response/error types around it.

use async_trait::async_trait;
use osai_core::{ContentPart, Message, TokenUsage, ToolCall, ToolDescriptor};

/// Errors surfaced by an LLM client.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Credential missing, invalid or expired.
    #[error("Auth error: {message}")]
    Auth {
        /// Error description.
        message: String,
    },

    /// Rate limited by the provider.
    #[error("Rate limited: retry after {retry_after_ms}ms")]
    RateLimited {
        /// Suggested retry delay in milliseconds.
        retry_after_ms: u64,
        /// Error description.
        message: String,
    },

    /// Provider returned an API error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Provider-specific error code.
        code: Option<String>,
        /// Whether this error can be retried.
        retryable: bool,
    },

    /// The response body did not have the expected shape.
    #[error("Malformed response: {message}")]
    Malformed {
        /// Error description.
        message: String,
    },
}

impl ProviderError {
    /// Whether the provider rejected the credential (401/403 or an explicit
    /// auth failure).
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Auth { .. } => true,
            Self::Api { status, .. } => is_auth_status(*status),
            Self::Http(e) => e.status().is_some_and(|s| is_auth_status(s.as_u16())),
            Self::Json(_) | Self::RateLimited { .. } | Self::Malformed { .. } => false,
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| {
                        s == reqwest::StatusCode::TOO_MANY_REQUESTS || s.is_server_error()
                    })
            }
            Self::RateLimited { .. } => true,
            Self::Api { retryable, .. } => *retryable,
            Self::Auth { .. } | Self::Json(_) | Self::Malformed { .. } => false,
        }
    }

    /// Provider-suggested delay before retrying, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_ms, .. } => Some(*retry_after_ms),
            _ => None,
        }
    }

    /// Short category label for logs.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) | Self::Malformed { .. } => "parse",
            Self::Auth { .. } => "auth",
            Self::RateLimited { .. } => "rate_limit",
            Self::Api { .. } if self.is_auth() => "auth",
            Self::Api { .. } => "api",
        }
    }
}

fn is_auth_status(status: u16) -> bool {
    status == 401 || status == 403
}

/// Result alias for client calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// One model call: the whole transcript plus declarations.
#[derive(Clone, Copy, Debug)]
pub struct LlmRequest<'a> {
    /// System instruction.
    pub system: &'a str,
    /// Full transcript so far.
    pub messages: &'a [Message],
    /// Tools the model may call.
    pub tools: &'a [ToolDescriptor],
}

/// One model reply.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmResponse {
    /// Text and `ToolUse` parts in the order the model produced them.
    pub content: Vec<ContentPart>,
    /// Tokens consumed by this call.
    pub usage: TokenUsage,
    /// Provider stop reason, if reported.
    pub stop_reason: Option<String>,
}

impl LlmResponse {
    /// Text-only reply.
    pub fn text(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            content: vec![ContentPart::text(text)],
            usage,
            stop_reason: Some("end_turn".into()),
        }
    }

    /// Tool calls requested by this reply, in order.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::ToolUse { id, name, input } => Some(ToolCall {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// All text parts joined with newlines; empty when there are none.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentPart::as_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// An LLM capability: send a conversation, get back text or tool calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name, e.g. `"anthropic"`.
    fn provider(&self) -> &str;

    /// Model identifier.
    fn model(&self) -> &str;

    /// Run one completion over the full transcript.
    async fn complete(&self, request: LlmRequest<'_>) -> ProviderResult<LlmResponse>;
}
