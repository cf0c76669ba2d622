//! Route policy and access decision types

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::RoleTag;

/// Which roles may enter a route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowedRoles {
    /// Any role, or no role at all
    #[default]
    Unrestricted,
    /// Only the listed roles
    Only(BTreeSet<RoleTag>),
}

impl AllowedRoles {
    /// Restrict to the given roles
    pub fn only(roles: impl IntoIterator<Item = RoleTag>) -> Self {
        Self::Only(roles.into_iter().collect())
    }

    /// Whether `role` passes this restriction
    pub fn permits(&self, role: RoleTag) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Only(roles) => roles.contains(&role),
        }
    }

    /// Whether the set is restricted
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Only(_))
    }
}

/// Authorization requirement attached to a protected section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutePolicy {
    /// Whether an authenticated principal is required
    pub require_auth: bool,
    /// Roles allowed in the section
    pub allowed_roles: AllowedRoles,
}

impl RoutePolicy {
    /// Open to everyone
    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    /// Any authenticated principal
    #[must_use]
    pub fn authenticated() -> Self {
        Self {
            require_auth: true,
            allowed_roles: AllowedRoles::Unrestricted,
        }
    }

    /// Authenticated principal with one of the given roles
    #[must_use]
    pub fn roles(roles: impl IntoIterator<Item = RoleTag>) -> Self {
        Self {
            require_auth: true,
            allowed_roles: AllowedRoles::only(roles),
        }
    }

    /// Override whether authentication is required
    #[must_use]
    pub fn with_require_auth(mut self, require: bool) -> Self {
        self.require_auth = require;
        self
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Allow,
    RedirectToLogin,
    RedirectToRoleHome,
    RedirectToUnauthorized,
}

/// Result of evaluating a [`RoutePolicy`] for a request.
///
/// Fields are private so a decision cannot change after it is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    outcome: DecisionOutcome,
    target_path: Option<String>,
}

impl AccessDecision {
    /// Let the request through
    pub fn allow() -> Self {
        Self {
            outcome: DecisionOutcome::Allow,
            target_path: None,
        }
    }

    /// Send the caller somewhere else
    pub fn redirect(outcome: DecisionOutcome, target: impl Into<String>) -> Self {
        debug_assert!(outcome != DecisionOutcome::Allow);
        Self {
            outcome,
            target_path: Some(target.into()),
        }
    }

    pub fn outcome(&self) -> DecisionOutcome {
        self.outcome
    }

    pub fn target_path(&self) -> Option<&str> {
        self.target_path.as_deref()
    }

    pub fn is_allowed(&self) -> bool {
        self.outcome == DecisionOutcome::Allow
    }
}
