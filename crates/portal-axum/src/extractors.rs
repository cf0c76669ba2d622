//! Axum extractors for the validated principal.
//!
//! Both read the [`SessionContext`] that [`crate::AccessLayer`] attaches to
//! the request, so a session is validated once per request.
//!
//! ```ignore
//! async fn dashboard(RequirePrincipal(user): RequirePrincipal) -> String {
//!     format!("Hello, {}!", user.label())
//! }
//!
//! async fn banner(MaybePrincipal(user): MaybePrincipal) -> String {
//!     user.map_or("Sign in".to_string(), |u| u.label().to_string())
//! }
//! ```

use std::convert::Infallible;
use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use portal_auth_core::SessionError;
use portal_types::Principal;

use crate::context::SessionContext;
use crate::error::AuthError;

/// Extractor that requires a valid session (401 otherwise).
#[derive(Debug, Clone)]
pub struct RequirePrincipal(pub Principal);

impl Deref for RequirePrincipal {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for RequirePrincipal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<SessionContext>()
            .ok_or(AuthError::MissingContext)?;

        match &ctx.principal {
            Some(principal) => Ok(Self(principal.clone())),
            None => Err(AuthError::Unauthenticated(
                ctx.error.unwrap_or(SessionError::NoSession),
            )),
        }
    }
}

/// Extractor for an optional principal; anonymous when absent.
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<Principal>);

impl Deref for MaybePrincipal {
    type Target = Option<Principal>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for MaybePrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<SessionContext>()
            .and_then(|ctx| ctx.principal.clone());
        Ok(Self(principal))
    }
}
