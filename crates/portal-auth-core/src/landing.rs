//! Post-authentication landing resolution
//!
//! [`landing_target`] is the decision table; [`LandingRouter`] maps its
//! result onto configured paths and [`LandingState`] keeps callers from
//! resolving before session and profile data have both arrived.

use portal_types::{Principal, ProfileCompleteness, RoleTag};
use serde::Serialize;
use std::sync::Arc;

use crate::routes::RouteTable;

/// Canonical destination of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LandingTarget {
    Login,
    ConsumerProfile,
    ConsumerHome,
    Workspace,
}

/// Decision table for where a session lands.
///
/// Total over every role and profile state; adding a role without
/// extending this match does not compile.
pub const fn landing_target(role: Option<RoleTag>, profile: ProfileCompleteness) -> LandingTarget {
    match (role, profile) {
        (None, _) => LandingTarget::Login,
        (Some(RoleTag::Consumer), ProfileCompleteness::Complete) => LandingTarget::ConsumerHome,
        (Some(RoleTag::Consumer), ProfileCompleteness::Incomplete | ProfileCompleteness::Unknown) => {
            LandingTarget::ConsumerProfile
        }
        (Some(RoleTag::Agent | RoleTag::Manager | RoleTag::Admin), _) => LandingTarget::Workspace,
    }
}

/// Resolves landing targets to configured paths.
#[derive(Debug, Clone)]
pub struct LandingRouter {
    routes: Arc<RouteTable>,
}

impl LandingRouter {
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Path for a landing target
    pub fn path_for(&self, target: LandingTarget) -> &str {
        match target {
            LandingTarget::Login => &self.routes.login,
            LandingTarget::ConsumerProfile => &self.routes.consumer_profile,
            LandingTarget::ConsumerHome => &self.routes.consumer_home,
            LandingTarget::Workspace => &self.routes.workspace_home,
        }
    }

    /// Home path for `principal`; absent or invalid principals go to login
    pub fn resolve_home(&self, principal: Option<&Principal>, profile: ProfileCompleteness) -> &str {
        let role = principal.and_then(Principal::verified_role);
        self.path_for(landing_target(role, profile))
    }
}

/// What a page knows about the session while deciding where to land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionView<'a> {
    /// Validation still in flight
    Loading,
    Anonymous,
    Authenticated(&'a Principal),
}

/// Page-level landing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "target", rename_all = "snake_case")]
pub enum LandingState {
    /// Session not yet validated; render a neutral waiting state
    Loading,
    Unauthenticated,
    /// Authenticated, waiting for the data needed to pick a target
    Resolving,
    Resolved(LandingTarget),
}

impl LandingState {
    /// Derive the state from what is currently known.
    ///
    /// A consumer with unloaded profile data stays `Resolving`, so no target
    /// is produced that would have to be corrected once the profile arrives.
    pub fn derive(session: SessionView<'_>, profile: ProfileCompleteness) -> Self {
        match session {
            SessionView::Loading => Self::Loading,
            SessionView::Anonymous => Self::Unauthenticated,
            SessionView::Authenticated(principal) => match principal.verified_role() {
                None => Self::Unauthenticated,
                Some(RoleTag::Consumer) if profile == ProfileCompleteness::Unknown => Self::Resolving,
                role => Self::Resolved(landing_target(role, profile)),
            },
        }
    }

    /// Target to navigate to, if one is settled
    pub fn target(&self) -> Option<LandingTarget> {
        match self {
            Self::Loading | Self::Resolving => None,
            Self::Unauthenticated => Some(LandingTarget::Login),
            Self::Resolved(target) => Some(*target),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.target().is_some()
    }
}
