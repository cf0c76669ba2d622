//! Portal Axum Integration
//!
//! Axum middleware and extractors for cookie-backed portal sessions.
//!
//! # Overview
//!
//! - **Session**: [`SessionSettings`] and the per-request [`CookieSession`]
//!   extractor, backed by [`CookieBackend`]
//! - **Middleware**: [`AccessLayer`] evaluates a route policy and redirects
//!   denied requests
//! - **Extractors**: [`RequirePrincipal`], [`MaybePrincipal`]
//!
//! # Quick Start
//!
//! ```ignore
//! use portal_axum::{AccessLayer, RequirePrincipal, SessionSettings};
//! use axum::{Router, routing::get};
//!
//! async fn dashboard(user: RequirePrincipal) -> String {
//!     format!("Hello, {}!", user.label())
//! }
//!
//! let app = Router::new()
//!     .route("/workspace", get(dashboard))
//!     .route_layer(AccessLayer::new(settings, guard, require_roles(RoleTag::WORKSPACE)));
//! ```

pub mod context;
pub mod cookie;
pub mod error;
pub mod extractors;
pub mod layer;
pub mod session;

pub use context::SessionContext;
pub use cookie::{read_cookie, CookieBackend, CookieMutation, CookieSettings};
pub use error::AuthError;
pub use extractors::{MaybePrincipal, RequirePrincipal};
pub use layer::{AccessLayer, AccessService};
pub use session::{CookieSession, SessionSettings};
