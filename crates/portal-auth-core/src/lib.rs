//! Portal Auth Core - Session and access-control logic
//!
//! Stores a principal in a cookie-like slot, re-validates it on every
//! request, evaluates route policies and resolves where a session lands.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod guard;
pub mod landing;
pub mod routes;
pub mod store;
pub mod validator;

pub use codec::{CodecError, SessionCodec, SessionPayload, SCHEMA_VERSION};
pub use config::{SessionConfig, DEFAULT_COOKIE_NAME};
pub use crypto::{constant_time_eq, HmacKey, HmacKeyError};
pub use error::SessionError;
pub use guard::{require_roles, AccessGuard};
pub use landing::{landing_target, LandingRouter, LandingState, LandingTarget, SessionView};
pub use routes::{RoleScope, RouteTable};
pub use store::{MemoryBackend, NullBackend, SessionBackend, SessionStore, StoredSession};
pub use validator::SessionValidator;
