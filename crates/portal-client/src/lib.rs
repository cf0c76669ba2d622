//! Portal Client - session sync for portal front-ends
//!
//! Keeps a locally cached principal consistent with the session service:
//! pushes logins and logouts, pulls validation results and exposes the
//! cache as immutable snapshots.

pub mod cache;
pub mod config;
pub mod error;
pub mod retry;
pub mod sync;

pub use cache::{CachePhase, CacheSnapshot, PrincipalCache};
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use retry::{RetryConfig, RetryableError, SyncPolicy};
pub use sync::SyncClient;
