//! # Harness Error Types
//!
//! Unified error handling for the API clients, bootstrappers, scenarios and CLI.

use thiserror::Error;

/// Harness operation result type
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// Error types for harness operations
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status for {operation}: HTTP {status} - {body}")]
    UnexpectedStatus {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Assertion failed in '{step}': {message}")]
    Assertion { step: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("JSON serialization/deserialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bootstrap error: {0}")]
    Bootstrap(String),

    #[error("Document store error: {0}")]
    DocumentStore(String),

    #[error("Invalid response: {field} - {reason}")]
    InvalidResponse { field: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl HarnessError {
    /// Create an unexpected status error from an HTTP response
    pub fn unexpected_status(
        operation: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::UnexpectedStatus {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an assertion failure for a scenario step
    pub fn assertion(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Assertion {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Create an invalid response error for protocol violations
    ///
    /// Use this when a response body is missing a field the contract
    /// guarantees, e.g. a created post without an identifier.
    pub fn invalid_response(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for connection failures and timeouts
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, HarnessError::Transport(_))
    }

    /// Check if error is recoverable (worth re-running)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            HarnessError::Transport(e) => e.is_timeout() || e.is_connect(),
            HarnessError::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
