//! JSON-RPC error codes and the handler error type.

use osai_runtime::{CredentialError, SessionError};

use crate::rpc::types::RpcErrorBody;

// ── Error code constants ────────────────────────────────────────────

/// Invalid JSON.
pub const PARSE_ERROR: i32 = -32700;
/// JSON that is not a request object.
pub const INVALID_REQUEST: i32 = -32600;
/// Method not registered.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Missing or malformed parameters.
pub const INVALID_PARAMS: i32 = -32602;
/// Unexpected server-side failure.
pub const INTERNAL_ERROR: i32 = -32603;
/// Credential missing or rejected.
pub const CREDENTIAL_ERROR: i32 = osai_runtime::CREDENTIAL_ERROR_CODE;

/// Error returned by handlers and the dispatch path.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Frame was not valid JSON.
    #[error("Parse error")]
    Parse,

    /// Frame was JSON but not a request.
    #[error("Invalid Request")]
    InvalidRequest,

    /// No handler for the method.
    #[error("Method not found")]
    MethodNotFound {
        /// Requested method.
        method: String,
    },

    /// Required parameter missing or wrong type.
    #[error("{message}")]
    InvalidParams {
        /// Description of what is wrong.
        message: String,
    },

    /// Internal server error.
    #[error("{message}")]
    Internal {
        /// Description.
        message: String,
    },

    /// Credential problem with its stable message.
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl RpcError {
    /// Numeric code for this variant.
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse => PARSE_ERROR,
            Self::InvalidRequest => INVALID_REQUEST,
            Self::MethodNotFound { .. } => METHOD_NOT_FOUND,
            Self::InvalidParams { .. } => INVALID_PARAMS,
            Self::Internal { .. } => INTERNAL_ERROR,
            Self::Credential(e) => e.code(),
        }
    }

    /// Shorthand for `InvalidParams`.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Convert to the wire-format error body.
    pub fn to_error_body(&self) -> RpcErrorBody {
        RpcErrorBody {
            code: self.code(),
            message: self.to_string(),
            data: match self {
                Self::MethodNotFound { method } => Some(serde_json::json!({ "method": method })),
                _ => None,
            },
        }
    }
}

impl From<SessionError> for RpcError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Credential(c) => Self::Credential(c),
            SessionError::UnknownProvider(_) => Self::InvalidParams {
                message: e.to_string(),
            },
            SessionError::Backend(message) => Self::Internal { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn standard_codes() {
        assert_eq!(RpcError::Parse.code(), -32700);
        assert_eq!(RpcError::InvalidRequest.code(), -32600);
        assert_eq!(
            RpcError::MethodNotFound {
                method: "x".into()
            }
            .code(),
            -32601
        );
        assert_eq!(RpcError::invalid_params("Missing 'task'").code(), -32602);
        assert_eq!(
            RpcError::Internal {
                message: "boom".into()
            }
            .code(),
            -32603
        );
    }

    #[test]
    fn credential_body() {
        let body = RpcError::from(CredentialError::Missing).to_error_body();
        assert_eq!(body.code, -32000);
        assert_eq!(
            body.message,
            "API key required. Please configure your Anthropic API key in Settings."
        );
        assert!(body.data.is_none());
    }

    #[test]
    fn method_not_found_carries_method() {
        let body = RpcError::MethodNotFound {
            method: "agent.pause".into(),
        }
        .to_error_body();
        assert_eq!(body.message, "Method not found");
        assert_eq!(body.data.unwrap()["method"], "agent.pause");
    }

    #[test]
    fn session_error_mapping() {
        assert_matches!(
            RpcError::from(SessionError::Credential(CredentialError::Missing)),
            RpcError::Credential(CredentialError::Missing)
        );
        assert_eq!(
            RpcError::from(SessionError::UnknownProvider("openai".into())).code(),
            INVALID_PARAMS
        );
        assert_eq!(RpcError::from(SessionError::Backend("x".into())).code(), INTERNAL_ERROR);
    }
}
