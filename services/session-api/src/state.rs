//! Application state

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use portal_auth_core::{AccessGuard, LandingRouter};
use portal_axum::SessionSettings;

use crate::config::Config;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session cookie codec and attributes
    pub session: SessionSettings,
    /// Access decisions for guarded sections
    pub guard: AccessGuard,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config) -> Self {
        let routes = Arc::new(config.routes.clone());
        Self {
            session: SessionSettings::new(config.session.clone()),
            guard: AccessGuard::new(routes),
            config: Arc::new(config),
        }
    }

    pub fn landing(&self) -> &LandingRouter {
        self.guard.landing()
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> Duration {
        self.config.request_timeout
    }
}

impl FromRef<AppState> for SessionSettings {
    fn from_ref(state: &AppState) -> Self {
        state.session.clone()
    }
}
