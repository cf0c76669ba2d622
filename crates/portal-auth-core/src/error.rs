//! Session errors

use thiserror::Error;

/// Outcome of a failed session validation.
///
/// None of these are fatal: every variant means "treat the caller as
/// anonymous".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// No session is stored
    #[error("no session")]
    NoSession,

    /// Stored value could not be decoded
    #[error("corrupt session")]
    Corrupt,

    /// Stored value decoded but lacks id, email or role
    #[error("incomplete session")]
    Incomplete,

    /// Session lifetime has elapsed
    #[error("session expired")]
    Expired,
}

impl SessionError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        401
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoSession => "NO_SESSION",
            Self::Corrupt => "CORRUPT_SESSION",
            Self::Incomplete => "INCOMPLETE_SESSION",
            Self::Expired => "SESSION_EXPIRED",
        }
    }

    /// Whether the store was cleared while producing this error
    pub fn clears_store(&self) -> bool {
        !matches!(self, Self::NoSession)
    }
}
