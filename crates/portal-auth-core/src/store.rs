//! Session store
//!
//! [`SessionStore`] persists one principal in a single value slot provided by
//! a [`SessionBackend`]. Backends only move opaque strings; encoding,
//! signing and expiry live in the store and its codec.

use parking_lot::RwLock;
use portal_types::Principal;
use std::sync::Arc;
use std::time::Duration;

use crate::codec::{SessionCodec, SessionPayload};
use crate::config::SessionConfig;
use crate::crypto::fingerprint;

/// Opaque stored form of a session.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredSession(String);

impl StoredSession {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Loggable tag for this value
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.0)
    }
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StoredSession").field(&self.fingerprint()).finish()
    }
}

/// A single value slot holding the stored session.
///
/// Implementations never fail: a backend without working storage reports
/// the slot as empty and drops writes.
pub trait SessionBackend: Send + Sync {
    /// Read the current value
    fn load(&self) -> Option<StoredSession>;

    /// Overwrite the current value
    fn save(&self, value: StoredSession);

    /// Empty the slot; emptying an empty slot is a no-op
    fn remove(&self);
}

impl<B: SessionBackend + ?Sized> SessionBackend for Arc<B> {
    fn load(&self) -> Option<StoredSession> {
        (**self).load()
    }

    fn save(&self, value: StoredSession) {
        (**self).save(value);
    }

    fn remove(&self) {
        (**self).remove();
    }
}

impl<B: SessionBackend + ?Sized> SessionBackend for &B {
    fn load(&self) -> Option<StoredSession> {
        (**self).load()
    }

    fn save(&self, value: StoredSession) {
        (**self).save(value);
    }

    fn remove(&self) {
        (**self).remove();
    }
}

/// In-process slot. Clones share the same slot; the last write wins.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Arc<RwLock<Option<StoredSession>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionBackend for MemoryBackend {
    fn load(&self) -> Option<StoredSession> {
        self.slot.read().clone()
    }

    fn save(&self, value: StoredSession) {
        *self.slot.write() = Some(value);
    }

    fn remove(&self) {
        *self.slot.write() = None;
    }
}

/// Backend for environments without storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl SessionBackend for NullBackend {
    fn load(&self) -> Option<StoredSession> {
        None
    }

    fn save(&self, _value: StoredSession) {}

    fn remove(&self) {}
}

/// Cookie-like persistence of one serialized [`Principal`].
#[derive(Debug, Clone)]
pub struct SessionStore<B> {
    backend: B,
    codec: SessionCodec,
    ttl: Option<Duration>,
}

impl<B: SessionBackend> SessionStore<B> {
    /// Create a store over `backend` using the codec and lifetime from `config`
    pub fn new(backend: B, config: &SessionConfig) -> Self {
        Self {
            backend,
            codec: SessionCodec::from_key(config.signing_key.clone()),
            ttl: config.ttl,
        }
    }

    /// Create a store with an explicit codec and lifetime
    pub fn with_codec(backend: B, codec: SessionCodec, ttl: Option<Duration>) -> Self {
        Self { backend, codec, ttl }
    }

    /// Serialize `principal` into the slot, replacing any previous session.
    ///
    /// Encoding failures are logged and leave the slot untouched.
    pub fn put(&self, principal: &Principal) {
        if !principal.is_valid() {
            tracing::debug!(id = %principal.id, "Storing incomplete principal");
        }

        let payload = SessionPayload::new(principal, self.ttl);
        match self.codec.encode(&payload) {
            Ok(stored) => {
                tracing::debug!(session = %stored.fingerprint(), "Session stored");
                self.backend.save(stored);
            }
            Err(e) => tracing::error!("Failed to encode session: {}", e),
        }
    }

    /// Write an already-encoded value as-is
    pub fn put_raw(&self, stored: StoredSession) {
        self.backend.save(stored);
    }

    /// Current stored value, if any
    pub fn get(&self) -> Option<StoredSession> {
        self.backend.load()
    }

    /// Remove the stored session
    pub fn clear(&self) {
        self.backend.remove();
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
