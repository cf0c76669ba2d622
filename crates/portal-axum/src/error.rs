//! Error types for session extractors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use portal_auth_core::SessionError;
use portal_types::Ack;

/// Authentication errors raised by extractors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No valid session on the request.
    #[error("authentication required: {0}")]
    Unauthenticated(SessionError),

    /// The access layer did not run for this route.
    #[error("session context missing; is AccessLayer installed?")]
    MissingContext,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthenticated(e) => (
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::UNAUTHORIZED),
                e.to_string(),
            ),
            Self::MissingContext => {
                tracing::error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        (status, Json(Ack::failed(message))).into_response()
    }
}
