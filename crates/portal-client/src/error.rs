//! Client errors
//!
//! Every variant is a transport-level failure from the caller's point of
//! view: the sync client logs and swallows them, leaving its cache as-is.

use std::time::Duration;

use thiserror::Error;

/// Errors from calls to the session service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection could not be established or was dropped.
    #[error("transport error: {0}")]
    Transport(String),

    /// Request did not finish in time.
    #[error("request timeout after {0:?}")]
    Timeout(Duration),

    /// Server answered with an unexpected status.
    #[error("unexpected status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error text from the body, if any
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl ClientError {
    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Timeout(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) => false,
            Self::Config(_) => false,
        }
    }

    /// HTTP status if the server answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Map a reqwest error, reporting `timeout` for timed-out requests
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
