//! Session context attached to requests by the access layer.

use portal_auth_core::SessionError;
use portal_types::{AccessDecision, Principal, RoleTag};

/// Outcome of session validation for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Principal of a valid session
    pub principal: Option<Principal>,
    /// Why there is no principal, if validation failed
    pub error: Option<SessionError>,
    /// Decision the guard made for this request
    pub decision: AccessDecision,
}

impl SessionContext {
    /// Build a context from a validation result
    pub fn from_validation(result: Result<Principal, SessionError>, decision: AccessDecision) -> Self {
        match result {
            Ok(principal) => Self {
                principal: Some(principal),
                error: None,
                decision,
            },
            Err(error) => Self {
                principal: None,
                error: Some(error),
                decision,
            },
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    pub fn role(&self) -> Option<RoleTag> {
        self.principal.as_ref().and_then(Principal::verified_role)
    }

    /// Whether the session failed in a way that cleared the cookie
    pub fn was_cleared(&self) -> bool {
        self.error.is_some_and(|e| e.clears_store())
    }
}
