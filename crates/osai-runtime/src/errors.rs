//! Runtime error types.

use osai_llm::ProviderError;

/// JSON-RPC code shared by every credential failure.
pub const CREDENTIAL_ERROR_CODE: i32 = -32000;

/// Credential problems, with the stable messages clients key off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// No credential on the connection and no process fallback.
    #[error("API key required. Please configure your Anthropic API key in Settings.")]
    Missing,

    /// The provider refused the credential (401/403).
    #[error(
        "Invalid or expired API key. Please check your Anthropic API key in Settings and ensure it is valid."
    )]
    Rejected,
}

impl CredentialError {
    /// Protocol error code.
    pub fn code(self) -> i32 {
        CREDENTIAL_ERROR_CODE
    }
}

/// Why a run ended `Failed`.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Credential rejected mid-run.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Any other provider failure.
    #[error("{0}")]
    Provider(ProviderError),

    /// Unexpected failure inside the runtime (tool worker panic, setup).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ProviderError> for RunError {
    fn from(e: ProviderError) -> Self {
        if e.is_auth() {
            Self::Credential(CredentialError::Rejected)
        } else {
            Self::Provider(e)
        }
    }
}

impl RunError {
    /// Protocol error code to attach to the final event, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Credential(e) => Some(e.code()),
            Self::Provider(_) | Self::Internal(_) => None,
        }
    }

    /// Short category label for logs.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Credential(_) => "credential",
            Self::Provider(e) => e.category(),
            Self::Internal(_) => "internal",
        }
    }
}

/// Session creation failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No usable credential.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The requested provider is not supported.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Client or tool construction failed.
    #[error("Session backend error: {0}")]
    Backend(String),
}

/// Attachment lookup failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The id is not a plain file name.
    #[error("invalid attachment id '{0}'")]
    InvalidId(String),

    /// No such attachment.
    #[error("attachment '{0}' not found")]
    NotFound(String),

    /// Read failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn auth_provider_error_becomes_credential() {
        let err = RunError::from(ProviderError::Api {
            status: 401,
            message: "invalid x-api-key".into(),
            code: None,
            retryable: false,
        });
        assert_matches!(err, RunError::Credential(CredentialError::Rejected));
        assert_eq!(err.code(), Some(-32000));
        assert!(err.to_string().starts_with("Invalid or expired API key"));
    }

    #[test]
    fn other_provider_error_passes_through() {
        let err = RunError::from(ProviderError::Api {
            status: 500,
            message: "overloaded".into(),
            code: None,
            retryable: true,
        });
        assert_matches!(err, RunError::Provider(_));
        assert_eq!(err.code(), None);
        assert_eq!(err.category(), "api");
    }

    #[test]
    fn missing_message_is_stable() {
        assert_eq!(
            CredentialError::Missing.to_string(),
            "API key required. Please configure your Anthropic API key in Settings."
        );
        assert_eq!(
            SessionError::from(CredentialError::Missing).to_string(),
            CredentialError::Missing.to_string()
        );
    }
}
