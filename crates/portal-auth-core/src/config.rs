//! Configuration types for session handling

use std::time::Duration;

use crate::crypto::{HmacKey, HmacKeyError};

/// Default name of the session cookie
pub const DEFAULT_COOKIE_NAME: &str = "portal_session";

/// Session layer configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the cookie carrying the stored session
    pub cookie_name: String,
    /// Key for signing stored sessions; `None` trusts the store as-is
    pub signing_key: Option<HmacKey>,
    /// Session lifetime; `None` keeps sessions valid until cleared
    pub ttl: Option<Duration>,
    /// Whether the cookie is marked `Secure`
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            signing_key: None,
            ttl: Some(Duration::from_secs(24 * 60 * 60)), // 24 hours
            secure_cookie: true,
        }
    }
}

impl SessionConfig {
    /// Create a config with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cookie name
    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Sign stored sessions with the given secret
    ///
    /// # Errors
    /// Returns error if the secret is shorter than [`HmacKey::MIN_KEY_LENGTH`].
    pub fn with_signing_secret(mut self, secret: impl AsRef<[u8]>) -> Result<Self, HmacKeyError> {
        self.signing_key = Some(HmacKey::new(secret)?);
        Ok(self)
    }

    /// Set the session lifetime (`None` disables expiry)
    #[must_use]
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set whether the cookie is `Secure`
    #[must_use]
    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    /// Whether stored sessions are signed
    pub fn is_signed(&self) -> bool {
        self.signing_key.is_some()
    }
}
