//! Configuration for the Session API service.

use std::time::Duration;

use portal_auth_core::{RouteTable, SessionConfig, DEFAULT_COOKIE_NAME};

/// Session API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Session cookie and signing configuration
    pub session: SessionConfig,

    /// Canonical portal routes
    pub routes: RouteTable,

    /// Request timeout for API routes
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // Server port
        let http_port = var("HTTP_PORT", "8080")
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Session cookie
        let cookie_name = var("SESSION_COOKIE_NAME", DEFAULT_COOKIE_NAME);
        if cookie_name.is_empty() || cookie_name.contains([';', '=', ' ']) {
            return Err(ConfigError::Invalid("SESSION_COOKIE_NAME"));
        }

        let secure_cookie = var("SESSION_COOKIE_SECURE", "true")
            .parse()
            .map_err(|_| ConfigError::Invalid("SESSION_COOKIE_SECURE"))?;

        // Session lifetime (default 24 hours, 0 disables expiry)
        let ttl_hours: u64 = var("SESSION_TTL_HOURS", "24")
            .parse()
            .map_err(|_| ConfigError::Invalid("SESSION_TTL_HOURS"))?;
        let ttl = (ttl_hours > 0).then(|| Duration::from_secs(ttl_hours * 3600));

        let mut session = SessionConfig::new()
            .with_cookie_name(cookie_name)
            .with_secure_cookie(secure_cookie)
            .with_ttl(ttl);

        // Session secret (minimum 32 bytes); unsigned cookies only on explicit opt-in
        let trust_unsigned: bool = var("SESSION_TRUST_UNSIGNED", "false")
            .parse()
            .map_err(|_| ConfigError::Invalid("SESSION_TRUST_UNSIGNED"))?;
        match lookup("SESSION_SECRET") {
            Some(secret) => {
                session = session.with_signing_secret(secret).map_err(|_| {
                    ConfigError::Invalid("SESSION_SECRET must be at least 32 characters")
                })?;
            }
            None if trust_unsigned => {}
            None => return Err(ConfigError::Missing("SESSION_SECRET")),
        }

        // Request timeout (default 30 seconds)
        let request_timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECS"));
        }

        // Portal routes
        let defaults = RouteTable::default();
        let route = |key: &'static str, default: &str| -> Result<String, ConfigError> {
            let path = var(key, default);
            if path.starts_with('/') {
                Ok(path)
            } else {
                Err(ConfigError::Invalid(key))
            }
        };
        let routes = RouteTable::new()
            .with_login(route("ROUTE_LOGIN", &defaults.login)?)
            .with_unauthorized(route("ROUTE_UNAUTHORIZED", &defaults.unauthorized)?)
            .with_consumer_profile(route("ROUTE_CONSUMER_PROFILE", &defaults.consumer_profile)?)
            .with_consumer_home(route("ROUTE_CONSUMER_HOME", &defaults.consumer_home)?)
            .with_workspace_home(route("ROUTE_WORKSPACE_HOME", &defaults.workspace_home)?);

        Ok(Self {
            http_port,
            session,
            routes,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
