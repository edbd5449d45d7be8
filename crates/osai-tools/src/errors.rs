//! Tool error types.

use thiserror::Error;

/// Failure of an OS primitive inside an [`InputDriver`](crate::InputDriver).
#[derive(Debug, Error)]
pub enum DriverError {
    /// No usable backend on this host (headless, missing permissions, feature off).
    #[error("input driver unavailable: {0}")]
    Unavailable(String),
    /// Keyboard or mouse synthesis failed.
    #[error("input synthesis failed: {0}")]
    Input(String),
    /// Screen capture failed.
    #[error("screen capture failed: {0}")]
    Capture(String),
    /// Clipboard access failed.
    #[error("clipboard error: {0}")]
    Clipboard(String),
}

/// Errors that can occur during tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Parameter validation failed.
    #[error("validation error: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// The requested action is not supported by this tool.
    #[error("unsupported action: {action}")]
    UnsupportedAction {
        /// The action name as received.
        action: String,
    },

    /// An OS primitive failed.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl ToolError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
