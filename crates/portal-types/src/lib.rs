//! Portal Types - Shared domain types
//!
//! This crate contains the value types shared by the portal session layer:
//! - Principal identity and the closed role taxonomy
//! - Consumer profile completeness
//! - Route policies and access decisions
//! - Wire bodies of the session endpoints

pub mod api;
pub mod error;
pub mod policy;
pub mod principal;
pub mod profile;

pub use api::*;
pub use error::*;
pub use policy::*;
pub use principal::*;
pub use profile::*;
