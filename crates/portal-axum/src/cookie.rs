//! Cookie-backed session storage.
//!
//! A [`CookieBackend`] lives for one request. It starts from the value in
//! the incoming `Cookie` header and records at most one pending mutation,
//! which the response side turns into a `Set-Cookie` header.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue};
use parking_lot::Mutex;
use portal_auth_core::{SessionBackend, SessionConfig, StoredSession};

/// Attributes of the session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
    /// `None` emits a browser-session cookie
    pub max_age: Option<Duration>,
}

impl CookieSettings {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.secure_cookie,
            max_age: config.ttl,
        }
    }

    /// `Set-Cookie` value storing `value`
    pub fn set_header(&self, value: &StoredSession) -> Option<HeaderValue> {
        let max_age = self
            .max_age
            .map(|ttl| format!("; Max-Age={}", ttl.as_secs()))
            .unwrap_or_default();
        self.header(value.as_str(), &max_age)
    }

    /// `Set-Cookie` value expiring the cookie
    pub fn expire_header(&self) -> Option<HeaderValue> {
        self.header("", "; Max-Age=0")
    }

    fn header(&self, value: &str, max_age: &str) -> Option<HeaderValue> {
        let secure = if self.secure { "; Secure" } else { "" };
        let cookie = format!(
            "{}={}; HttpOnly{}; SameSite=Lax; Path=/{}",
            self.name, value, secure, max_age
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(error = %e, cookie = %self.name, "Session value is not a valid header");
                None
            }
        }
    }
}

/// Value of cookie `name` in `headers`, if present and non-empty
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Change to emit on the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieMutation {
    Set(StoredSession),
    Expire,
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<StoredSession>,
    pending: Option<CookieMutation>,
}

/// Request-scoped session backend over the `Cookie` header.
///
/// Clones share state, so the handler and the response layer see the same
/// pending mutation.
#[derive(Debug, Clone, Default)]
pub struct CookieBackend {
    slot: Arc<Mutex<Slot>>,
}

impl CookieBackend {
    /// Backend seeded with the request's cookie `name`
    pub fn from_headers(headers: &HeaderMap, name: &str) -> Self {
        Self::with_value(read_cookie(headers, name).map(StoredSession::new))
    }

    pub fn with_value(value: Option<StoredSession>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                current: value,
                pending: None,
            })),
        }
    }

    /// Mutation recorded during the request, if any
    pub fn pending(&self) -> Option<CookieMutation> {
        self.slot.lock().pending.clone()
    }

    /// `Set-Cookie` header for the pending mutation
    pub fn set_cookie_header(&self, settings: &CookieSettings) -> Option<HeaderValue> {
        match self.pending()? {
            CookieMutation::Set(value) => settings.set_header(&value),
            CookieMutation::Expire => settings.expire_header(),
        }
    }
}

impl SessionBackend for CookieBackend {
    fn load(&self) -> Option<StoredSession> {
        self.slot.lock().current.clone()
    }

    fn save(&self, value: StoredSession) {
        let mut slot = self.slot.lock();
        slot.current = Some(value.clone());
        slot.pending = Some(CookieMutation::Set(value));
    }

    fn remove(&self) {
        let mut slot = self.slot.lock();
        slot.current = None;
        slot.pending = Some(CookieMutation::Expire);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> CookieSettings {
        CookieSettings {
            name: "portal_session".to_string(),
            secure: true,
            max_age: Some(Duration::from_secs(86_400)),
        }
    }

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_read_cookie() {
        let headers = headers("theme=dark; portal_session=abc.def; lang=es");
        assert_eq!(read_cookie(&headers, "portal_session").as_deref(), Some("abc.def"));
        assert_eq!(read_cookie(&headers, "portal"), None);
        assert_eq!(read_cookie(&HeaderMap::new(), "portal_session"), None);
        assert_eq!(read_cookie(&self::headers("portal_session="), "portal_session"), None);
    }

    #[test]
    fn test_set_header_attributes() {
        let value = settings().set_header(&StoredSession::new("abc")).unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "portal_session=abc; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=86400"
        );
    }

    #[test]
    fn test_expire_header() {
        let insecure = CookieSettings {
            secure: false,
            ..settings()
        };
        assert_eq!(
            insecure.expire_header().unwrap().to_str().unwrap(),
            "portal_session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"
        );
    }

    #[test]
    fn test_indefinite_ttl_omits_max_age() {
        let session_only = CookieSettings {
            max_age: None,
            ..settings()
        };
        let value = session_only.set_header(&StoredSession::new("abc")).unwrap();
        assert!(!value.to_str().unwrap().contains("Max-Age"));
    }

    #[test]
    fn test_backend_records_mutations() {
        let backend = CookieBackend::from_headers(&headers("portal_session=old"), "portal_session");
        assert_eq!(backend.load(), Some(StoredSession::new("old")));
        assert_eq!(backend.pending(), None);
        assert!(backend.set_cookie_header(&settings()).is_none());

        backend.save(StoredSession::new("new"));
        assert_eq!(backend.load(), Some(StoredSession::new("new")));

        backend.remove();
        assert_eq!(backend.load(), None);
        assert_eq!(backend.pending(), Some(CookieMutation::Expire));
    }

    #[test]
    fn test_clones_share_state() {
        let backend = CookieBackend::default();
        let handle = backend.clone();
        handle.save(StoredSession::new("v"));
        assert_eq!(backend.pending(), Some(CookieMutation::Set(StoredSession::new("v"))));
    }
}
