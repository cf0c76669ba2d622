//! Session validation
//!
//! The validator is the single authority on whether a request carries a
//! trusted principal. Anything that fails validation is removed from the
//! store so an unusable session never lingers.

use chrono::Utc;
use portal_types::Principal;

use crate::error::SessionError;
use crate::store::{SessionBackend, SessionStore};

/// Re-derives a [`Principal`] from a [`SessionStore`].
#[derive(Debug)]
pub struct SessionValidator<'a, B> {
    store: &'a SessionStore<B>,
}

impl<'a, B: SessionBackend> SessionValidator<'a, B> {
    pub fn new(store: &'a SessionStore<B>) -> Self {
        Self { store }
    }

    /// Validate the stored session against the current time
    pub fn validate(&self) -> Result<Principal, SessionError> {
        self.validate_at(Utc::now().timestamp_millis())
    }

    /// Validate the stored session as of `now_ms`
    pub fn validate_at(&self, now_ms: i64) -> Result<Principal, SessionError> {
        let Some(stored) = self.store.get() else {
            return Err(SessionError::NoSession);
        };

        let payload = match self.store.codec().decode(&stored) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(session = %stored.fingerprint(), error = %e, "Clearing corrupt session");
                self.store.clear();
                return Err(SessionError::Corrupt);
            }
        };

        if payload.is_expired_at(now_ms) {
            tracing::debug!(session = %stored.fingerprint(), "Clearing expired session");
            self.store.clear();
            return Err(SessionError::Expired);
        }

        if payload.uses_legacy_role() {
            tracing::debug!(session = %stored.fingerprint(), "Session role read from legacy type field");
        }

        let principal = payload.into_principal();
        if !principal.is_valid() {
            tracing::warn!(session = %stored.fingerprint(), "Clearing incomplete session");
            self.store.clear();
            return Err(SessionError::Incomplete);
        }

        Ok(principal)
    }

    /// Validate, treating every failure as anonymous
    pub fn validate_optional(&self) -> Option<Principal> {
        self.validate().ok()
    }
}

impl<B: SessionBackend> SessionStore<B> {
    /// Shorthand for `SessionValidator::new(self).validate()`
    pub fn validate(&self) -> Result<Principal, SessionError> {
        SessionValidator::new(self).validate()
    }
}
