//! Session validation, sync and landing handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use portal_auth_core::{LandingState, SessionView};
use portal_axum::{CookieMutation, CookieSession};
use portal_types::{Ack, LandingRequest, ProfileCompleteness, SyncRequest, ValidateResponse};
use serde::Serialize;
use tracing::instrument;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Validate the session cookie.
///
/// GET /api/auth/validate
///
/// Unusable sessions are answered with 401 and the cookie is expired.
pub async fn validate(session: CookieSession) -> Response {
    let result = session
        .validate()
        .map(|user| Json(ValidateResponse::valid(user)))
        .map_err(ApiError::from);
    session.finish(result)
}

/// Mirror a client-side login or logout into the session cookie.
///
/// POST /api/auth/sync
#[instrument(skip_all)]
pub async fn sync(
    session: CookieSession,
    body: Result<Json<SyncRequest>, JsonRejection>,
) -> Response {
    let result = apply_sync(&session, body);
    session.finish(result)
}

fn apply_sync(
    session: &CookieSession,
    body: Result<Json<SyncRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    match request {
        SyncRequest::Login { user } => {
            if !user.is_valid() {
                return Err(ApiError::BadRequest("Invalid user data".to_string()));
            }
            session.store().put(&user);
            if !matches!(session.store().backend().pending(), Some(CookieMutation::Set(_))) {
                return Err(ApiError::Internal("session could not be stored".to_string()));
            }
            tracing::info!(user_id = %user.id, role = ?user.role, "Session synced");
        }
        SyncRequest::Logout => {
            session.store().clear();
            tracing::info!("Session cleared");
        }
    }

    Ok(Json(Ack::ok()))
}

/// Landing decision for the current session
#[derive(Debug, Serialize)]
pub struct LandingResponse {
    pub success: bool,
    /// Path to navigate to; absent while the profile is still needed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub landing: LandingState,
}

/// Resolve where the current session lands.
///
/// POST /api/auth/landing
///
/// The body may carry the consumer's profile fields; without them a
/// consumer stays `resolving` rather than being sent to a guessed page.
pub async fn landing(
    State(state): State<AppState>,
    session: CookieSession,
    body: Result<Json<LandingRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => LandingRequest::default(),
        Err(e) => return session.finish(ApiError::BadRequest(e.body_text())),
    };

    let profile = ProfileCompleteness::of(request.profile.as_ref());
    let validated = session.validate();
    let view = match &validated {
        Ok(principal) => SessionView::Authenticated(principal),
        Err(_) => SessionView::Anonymous,
    };
    let landing = LandingState::derive(view, profile);
    let target = landing
        .target()
        .map(|target| state.landing().path_for(target).to_string());

    tracing::debug!(?landing, ?target, "Landing resolved");
    session.finish(Json(LandingResponse {
        success: true,
        target,
        landing,
    }))
}
