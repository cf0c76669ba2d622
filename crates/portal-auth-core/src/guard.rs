//! Access guard: evaluates a [`RoutePolicy`] for a request.
//!
//! Checks run in a fixed order: authentication, then the policy's role set,
//! then role scopes of the requested path. Anonymous callers therefore always
//! see the login redirect and never learn which roles a section expects.

use portal_types::{AccessDecision, DecisionOutcome, Principal, ProfileCompleteness, RoleTag, RoutePolicy};
use std::sync::Arc;

use crate::landing::LandingRouter;
use crate::routes::{same_path, RouteTable};

/// Evaluates route policies. Reads principals, never stores them.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    landing: LandingRouter,
}

impl AccessGuard {
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self {
            landing: LandingRouter::new(routes),
        }
    }

    pub fn landing(&self) -> &LandingRouter {
        &self.landing
    }

    fn routes(&self) -> &RouteTable {
        self.landing.routes()
    }

    /// Decide access for `principal` on `current_path`
    pub fn decide(
        &self,
        principal: Option<&Principal>,
        policy: &RoutePolicy,
        current_path: &str,
    ) -> AccessDecision {
        self.decide_with_profile(principal, ProfileCompleteness::Unknown, policy, current_path)
    }

    /// Like [`AccessGuard::decide`], using `profile` to pick the role home
    pub fn decide_with_profile(
        &self,
        principal: Option<&Principal>,
        profile: ProfileCompleteness,
        policy: &RoutePolicy,
        current_path: &str,
    ) -> AccessDecision {
        let role = principal.and_then(Principal::verified_role);

        let Some(role) = role else {
            return self.decide_anonymous(policy, current_path);
        };

        if !policy.allowed_roles.permits(role) {
            tracing::debug!(%role, path = current_path, "Role not allowed by route policy");
            return self.role_home(principal, profile, current_path);
        }

        if let Some(scope) = self.routes().scopes_for(current_path).find(|s| !s.roles.permits(role)) {
            tracing::debug!(%role, path = current_path, scope = %scope.segment, "Role outside path scope");
            return self.role_home(principal, profile, current_path);
        }

        AccessDecision::allow()
    }

    fn decide_anonymous(&self, policy: &RoutePolicy, current_path: &str) -> AccessDecision {
        let scoped = self.routes().scopes_for(current_path).next().is_some();

        if policy.require_auth || scoped {
            return AccessDecision::redirect(
                DecisionOutcome::RedirectToLogin,
                self.routes().login_with_next(current_path),
            );
        }

        if policy.allowed_roles.is_restricted() {
            return AccessDecision::redirect(
                DecisionOutcome::RedirectToUnauthorized,
                self.routes().unauthorized.clone(),
            );
        }

        AccessDecision::allow()
    }

    fn role_home(
        &self,
        principal: Option<&Principal>,
        profile: ProfileCompleteness,
        current_path: &str,
    ) -> AccessDecision {
        let home = self.landing.resolve_home(principal, profile);

        // Redirecting a request to its own path would loop.
        if same_path(home, current_path) {
            tracing::warn!(path = current_path, "Role home is the denied path");
            return AccessDecision::redirect(
                DecisionOutcome::RedirectToUnauthorized,
                self.routes().unauthorized.clone(),
            );
        }

        AccessDecision::redirect(DecisionOutcome::RedirectToRoleHome, home)
    }
}

/// Policy for a section restricted to `roles`
pub fn require_roles(roles: impl IntoIterator<Item = RoleTag>) -> RoutePolicy {
    RoutePolicy::roles(roles)
}
