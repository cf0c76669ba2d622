//! Client configuration

use std::time::Duration;

use crate::retry::SyncPolicy;

/// Sync client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the session service, without trailing slash
    pub base_url: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// How failed sync calls are handled
    pub sync_policy: SyncPolicy,
}

impl ClientConfig {
    /// Create a configuration for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            sync_policy: SyncPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_sync_policy(mut self, policy: SyncPolicy) -> Self {
        self.sync_policy = policy;
        self
    }

    /// Check the configuration before building a client
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Absolute URL of an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Invalid client configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("base URL must be http(s): {0}")]
    InvalidBaseUrl(String),

    #[error("request timeout must be non-zero")]
    ZeroTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::new("http://localhost:8080/");
        assert_eq!(config.endpoint("/api/auth/validate"), "http://localhost:8080/api/auth/validate");
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::new("https://portal.example").validate().is_ok());
        assert_eq!(
            ClientConfig::new("portal.example").validate(),
            Err(ConfigError::InvalidBaseUrl("portal.example".to_string()))
        );
        assert_eq!(
            ClientConfig::new("http://x").with_request_timeout(Duration::ZERO).validate(),
            Err(ConfigError::ZeroTimeout)
        );
    }
}
