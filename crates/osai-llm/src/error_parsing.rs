//! API error response parsing.
//!
//! Handles the error envelope formats seen from providers and proxies:
//! - Standard: `{"error": {"message": "...", "type": "..."}}`
//! - Detail:   `{"detail": "..."}`
//! - Flat:     `{"message": "...", "code": "..."}`

use serde_json::Value;

use crate::provider::ProviderError;

/// Parsed API error information.
pub struct ApiErrorInfo {
    /// Human-readable error message.
    pub message: String,
    /// Provider-specific error code (e.g., `"overloaded_error"`).
    pub code: Option<String>,
    /// Whether the request can be retried (429 or 5xx).
    pub retryable: bool,
}

/// Parse an API error response body into structured error info.
///
/// Falls back to the raw body text if no known envelope matches.
pub fn parse_api_error(body: &str, status: u16) -> ApiErrorInfo {
    let retryable = status == 429 || status >= 500;

    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = json["error"]["message"].as_str() {
            let code = json["error"]["type"].as_str().map(String::from);
            return ApiErrorInfo {
                message: msg.to_string(),
                code,
                retryable,
            };
        }

        if let Some(msg) = json["detail"].as_str().or_else(|| json["message"].as_str()) {
            let code = json["code"]
                .as_str()
                .or_else(|| json["type"].as_str())
                .map(String::from);
            return ApiErrorInfo {
                message: msg.to_string(),
                code,
                retryable,
            };
        }
    }

    ApiErrorInfo {
        message: format!("HTTP {status}: {body}"),
        code: None,
        retryable,
    }
}

/// Map a non-success HTTP response to a [`ProviderError`].
///
/// 401/403 become [`ProviderError::Auth`], 429 becomes
/// [`ProviderError::RateLimited`], everything else [`ProviderError::Api`].
pub fn error_for_status(status: u16, body: &str, retry_after_secs: Option<u64>) -> ProviderError {
    let info = parse_api_error(body, status);
    match status {
        401 | 403 => ProviderError::Auth {
            message: info.message,
        },
        429 => ProviderError::RateLimited {
            retry_after_ms: retry_after_secs.unwrap_or(1).saturating_mul(1000),
            message: info.message,
        },
        _ => ProviderError::Api {
            status,
            message: info.message,
            code: info.code,
            retryable: info.retryable,
        },
    }
}
