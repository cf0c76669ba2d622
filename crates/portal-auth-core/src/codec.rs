//! Wire format of stored sessions
//!
//! A stored session is the JSON [`SessionPayload`] encoded as unpadded
//! base64url, optionally sealed with an HMAC signature. Unsigned stores also
//! accept plain JSON objects, the format written by older front ends.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use portal_types::{Principal, RoleTag};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::crypto::HmacKey;
use crate::store::StoredSession;

/// Current payload schema version
pub const SCHEMA_VERSION: u16 = 1;

fn unversioned() -> u16 {
    1
}

/// Stored session payload
///
/// `id` and `email` are optional on the wire so that records missing them
/// decode and are reported as incomplete rather than corrupt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Schema version; absent on payloads written before versioning
    #[serde(default = "unversioned")]
    pub v: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Canonical role field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Legacy role field, read only when `role` is absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<String>,
    /// Issue timestamp (milliseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration timestamp (milliseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl SessionPayload {
    /// Build a payload for `principal`, issued now
    pub fn new(principal: &Principal, ttl: Option<Duration>) -> Self {
        Self::issued_at(principal, Utc::now().timestamp_millis(), ttl)
    }

    /// Build a payload for `principal` issued at `now_ms`
    pub fn issued_at(principal: &Principal, now_ms: i64, ttl: Option<Duration>) -> Self {
        let exp = ttl.map(|ttl| {
            let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            now_ms.saturating_add(ttl_ms)
        });

        Self {
            v: SCHEMA_VERSION,
            id: Some(principal.id.clone()),
            email: Some(principal.email.clone()),
            name: principal.display_name.clone(),
            role: principal.role.map(|r| r.as_str().to_string()),
            legacy_type: None,
            iat: Some(now_ms),
            exp,
        }
    }

    /// Check if the payload is expired at `now_ms`
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.exp.is_some_and(|exp| now_ms > exp)
    }

    /// Whether the role came from the legacy `type` field
    pub fn uses_legacy_role(&self) -> bool {
        self.role.is_none() && self.legacy_type.is_some()
    }

    /// Resolve the role: `role` when present, otherwise legacy `type`.
    ///
    /// A present but unrecognised `role` yields `None`; it does not fall
    /// back to `type`.
    // TODO: drop the `type` fallback once no cookies written before the role rename remain.
    pub fn resolved_role(&self) -> Option<RoleTag> {
        self.role
            .as_deref()
            .or(self.legacy_type.as_deref())
            .and_then(|r| r.parse().ok())
    }

    /// Convert to a principal, which may be incomplete
    pub fn into_principal(self) -> Principal {
        let role = self.resolved_role();
        Principal {
            id: self.id.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            display_name: self.name,
            role,
        }
    }
}

/// Errors decoding or encoding a stored session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("session signature missing or invalid")]
    BadSignature,

    #[error("session payload is not valid base64")]
    BadEncoding,

    #[error("session payload is not a valid session object: {0}")]
    BadJson(String),

    #[error("unsupported session schema version {0}")]
    UnsupportedVersion(u16),

    #[error("failed to serialize session: {0}")]
    Serialize(String),
}

/// Encodes and decodes [`SessionPayload`]s, signing them when keyed.
#[derive(Debug, Clone, Default)]
pub struct SessionCodec {
    key: Option<HmacKey>,
}

impl SessionCodec {
    /// Codec for a store trusted to hold only server-written values
    pub fn trusted() -> Self {
        Self { key: None }
    }

    /// Codec that seals every value with `key`
    pub fn signed(key: HmacKey) -> Self {
        Self { key: Some(key) }
    }

    /// Codec from an optional key
    pub fn from_key(key: Option<HmacKey>) -> Self {
        Self { key }
    }

    pub fn is_signed(&self) -> bool {
        self.key.is_some()
    }

    /// Encode a payload into its stored form
    pub fn encode(&self, payload: &SessionPayload) -> Result<StoredSession, CodecError> {
        let json = serde_json::to_vec(payload).map_err(|e| CodecError::Serialize(e.to_string()))?;
        let encoded = URL_SAFE_NO_PAD.encode(json);

        let value = match &self.key {
            Some(key) => key.seal(&encoded),
            None => encoded,
        };
        Ok(StoredSession::new(value))
    }

    /// Decode a stored value, rejecting anything that is not a current-schema payload
    pub fn decode(&self, stored: &StoredSession) -> Result<SessionPayload, CodecError> {
        let raw = stored.as_str().trim();

        let json = match &self.key {
            Some(key) => {
                let encoded = key.open(raw).ok_or(CodecError::BadSignature)?;
                URL_SAFE_NO_PAD
                    .decode(encoded)
                    .map_err(|_| CodecError::BadEncoding)?
            }
            None if raw.starts_with('{') => raw.as_bytes().to_vec(),
            None => URL_SAFE_NO_PAD
                .decode(raw)
                .map_err(|_| CodecError::BadEncoding)?,
        };

        let payload: SessionPayload =
            serde_json::from_slice(&json).map_err(|e| CodecError::BadJson(e.to_string()))?;

        if payload.v != SCHEMA_VERSION {
            return Err(CodecError::UnsupportedVersion(payload.v));
        }

        Ok(payload)
    }
}
