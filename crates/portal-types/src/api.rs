//! Request and response bodies of the session endpoints

use serde::{Deserialize, Serialize};

use crate::{Principal, ProfileFields};

/// Body of `POST /api/auth/sync`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum SyncRequest {
    /// Mirror a client-side login into the server session
    Login { user: Principal },
    /// Drop the server session
    Logout,
}

/// Body of `GET /api/auth/validate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Principal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateResponse {
    pub fn valid(user: Principal) -> Self {
        Self {
            success: true,
            user: Some(user),
            error: None,
        }
    }
}

/// Acknowledgement returned by mutating endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Body of `POST /api/auth/landing`; omitted fields mean the profile is not loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingRequest {
    #[serde(default)]
    pub profile: Option<ProfileFields>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoleTag;

    #[test]
    fn test_sync_request_wire_format() {
        let login = SyncRequest::Login {
            user: Principal::new("u1", "a@b.com", RoleTag::Consumer),
        };
        let json = serde_json::to_value(&login).unwrap();
        assert_eq!(json["action"], "login");
        assert_eq!(json["user"]["role"], "consumer");

        let logout: SyncRequest = serde_json::from_str(r#"{"action":"logout"}"#).unwrap();
        assert_eq!(logout, SyncRequest::Logout);

        assert!(serde_json::from_str::<SyncRequest>(r#"{"action":"refresh"}"#).is_err());
    }

    #[test]
    fn test_validate_response_omits_empty_fields() {
        let body = ValidateResponse::valid(Principal::new("u2", "c@d.com", RoleTag::Agent));
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("error"));
        assert!(json.contains(r#""success":true"#));
    }
}
