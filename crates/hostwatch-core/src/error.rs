//! Error types for hostwatch

use crate::types::CheckKind;

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for hostwatch
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A value violated a construction invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// A probe failed in a way it could not turn into an outcome
    #[error("{kind} probe failed for host '{host}': {message}")]
    Probe {
        /// Check kind of the failing probe
        kind: CheckKind,
        /// Host being probed
        host: String,
        /// Error message
        message: String,
    },

    /// Report delivery error
    #[error("Notification error: {0}")]
    Notification(String),

    /// Runtime error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error (should not happen in production)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a probe error
    pub fn probe(kind: CheckKind, host: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Probe {
            kind,
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Whether the error should abort startup
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Validation(_))
    }
}
