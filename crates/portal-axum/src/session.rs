//! Per-request session access for handlers.
//!
//! ```ignore
//! async fn logout(session: CookieSession) -> Response {
//!     session.store().clear();
//!     session.finish(Json(Ack::ok()))
//! }
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use portal_auth_core::{SessionCodec, SessionConfig, SessionError, SessionStore};
use portal_types::Principal;

use crate::cookie::{CookieBackend, CookieSettings};

/// Shared session settings, cheap to clone into every request.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    inner: Arc<SettingsInner>,
}

#[derive(Debug)]
struct SettingsInner {
    codec: SessionCodec,
    cookie: CookieSettings,
    config: SessionConfig,
}

impl SessionSettings {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(SettingsInner {
                codec: SessionCodec::from_key(config.signing_key.clone()),
                cookie: CookieSettings::from_config(&config),
                config,
            }),
        }
    }

    pub fn cookie(&self) -> &CookieSettings {
        &self.inner.cookie
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Open the session carried by `headers`
    pub fn session_for(&self, headers: &HeaderMap) -> CookieSession {
        let backend = CookieBackend::from_headers(headers, &self.inner.cookie.name);
        CookieSession {
            store: SessionStore::with_codec(
                backend,
                self.inner.codec.clone(),
                self.inner.config.ttl,
            ),
            cookie: self.inner.cookie.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Session store bound to one request's cookie.
#[derive(Debug)]
pub struct CookieSession {
    store: SessionStore<CookieBackend>,
    cookie: CookieSettings,
}

impl CookieSession {
    pub fn store(&self) -> &SessionStore<CookieBackend> {
        &self.store
    }

    /// Validate the session, expiring the cookie if it was unusable
    pub fn validate(&self) -> Result<Principal, SessionError> {
        self.store.validate()
    }

    /// Attach any pending `Set-Cookie` to `response`
    pub fn finish(&self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if let Some(value) = self.store.backend().set_cookie_header(&self.cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        response
    }
}

impl<S> FromRequestParts<S> for CookieSession
where
    SessionSettings: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionSettings::from_ref(state).session_for(&parts.headers))
    }
}
