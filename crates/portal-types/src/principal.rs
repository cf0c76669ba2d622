//! Principal identity and role types

use serde::{Deserialize, Serialize};

use crate::RoleParseError;

/// Authorization roles of the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleTag {
    /// End customer browsing and buying products
    Consumer,
    /// Sales agent
    Agent,
    /// Agent team manager
    Manager,
    /// Portal administrator
    Admin,
}

impl RoleTag {
    /// Every role, in declaration order
    pub const ALL: [RoleTag; 4] = [Self::Consumer, Self::Agent, Self::Manager, Self::Admin];

    /// Roles that land in the shared agent workspace
    pub const WORKSPACE: [RoleTag; 3] = [Self::Agent, Self::Manager, Self::Admin];

    /// Wire name of the role
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Consumer => "consumer",
            Self::Agent => "agent",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Whether this role belongs to the workspace family
    pub const fn is_workspace(&self) -> bool {
        matches!(self, Self::Agent | Self::Manager | Self::Admin)
    }
}

impl std::fmt::Display for RoleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoleTag {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "consumer" => Ok(Self::Consumer),
            "agent" => Ok(Self::Agent),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

/// The authenticated identity of the current actor.
///
/// A principal may be incomplete (for example a stored record that lost its
/// role); such records are represented rather than rejected, and
/// [`Principal::is_valid`] decides whether they can be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable user identifier
    pub id: String,
    /// Email address
    pub email: String,
    /// Name to show in the UI
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Authorization role
    #[serde(default)]
    pub role: Option<RoleTag>,
}

impl Principal {
    /// Create a complete principal
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: RoleTag) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            role: Some(role),
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// True iff `id`, `email` and `role` are all present and non-blank
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.email.trim().is_empty() && self.role.is_some()
    }

    /// Role of a valid principal, `None` otherwise
    pub fn verified_role(&self) -> Option<RoleTag> {
        if self.is_valid() {
            self.role
        } else {
            None
        }
    }

    /// Name for display, falling back to the email address
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Free-function form of [`Principal::is_valid`]
pub fn is_valid(principal: &Principal) -> bool {
    principal.is_valid()
}
