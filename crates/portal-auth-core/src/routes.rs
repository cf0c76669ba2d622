//! Canonical portal routes and role-scoped path segments

use portal_types::{AllowedRoles, RoleTag};

/// A path segment that confines everything below it to a set of roles.
///
/// Scopes match on any segment, so `/es/consumer/cart` is inside the
/// `consumer` scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleScope {
    pub segment: String,
    pub roles: AllowedRoles,
}

impl RoleScope {
    pub fn new(segment: impl Into<String>, roles: impl IntoIterator<Item = RoleTag>) -> Self {
        Self {
            segment: segment.into().trim_matches('/').to_string(),
            roles: AllowedRoles::only(roles),
        }
    }

    /// Whether `path` lies inside this scope
    pub fn contains(&self, path: &str) -> bool {
        path_segments(path).any(|s| s == self.segment)
    }
}

/// Destinations and role scopes of the portal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    /// Sign-in page
    pub login: String,
    /// Shown when access is denied and no better destination exists
    pub unauthorized: String,
    /// Consumer profile-completion page
    pub consumer_profile: String,
    /// Consumer landing page (insurance listing)
    pub consumer_home: String,
    /// Agent / manager / admin dashboard
    pub workspace_home: String,
    /// Role-confined path segments
    pub scopes: Vec<RoleScope>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            unauthorized: "/unauthorized".to_string(),
            consumer_profile: "/consumer/profile".to_string(),
            consumer_home: "/consumer/insurance".to_string(),
            workspace_home: "/workspace".to_string(),
            scopes: vec![
                RoleScope::new("consumer", [RoleTag::Consumer]),
                RoleScope::new("workspace", RoleTag::WORKSPACE),
            ],
        }
    }
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_login(mut self, path: impl Into<String>) -> Self {
        self.login = path.into();
        self
    }

    #[must_use]
    pub fn with_unauthorized(mut self, path: impl Into<String>) -> Self {
        self.unauthorized = path.into();
        self
    }

    #[must_use]
    pub fn with_consumer_profile(mut self, path: impl Into<String>) -> Self {
        self.consumer_profile = path.into();
        self
    }

    #[must_use]
    pub fn with_consumer_home(mut self, path: impl Into<String>) -> Self {
        self.consumer_home = path.into();
        self
    }

    #[must_use]
    pub fn with_workspace_home(mut self, path: impl Into<String>) -> Self {
        self.workspace_home = path.into();
        self
    }

    /// Replace the role scopes
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<RoleScope>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Scopes that contain `path`
    pub fn scopes_for<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a RoleScope> + 'a {
        self.scopes.iter().filter(move |scope| scope.contains(path))
    }

    /// Login route carrying `next` as the post-login destination
    pub fn login_with_next(&self, next: &str) -> String {
        if next.is_empty() || same_path(next, &self.login) {
            return self.login.clone();
        }
        format!("{}?next={}", self.login, urlencoding::encode(next))
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty())
}

/// Compare two paths ignoring query, fragment and trailing slashes
pub(crate) fn same_path(a: &str, b: &str) -> bool {
    path_segments(a).eq(path_segments(b))
}
