//! Health check handlers

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use portal_auth_core::SessionPayload;
use portal_types::{Principal, RoleTag};
use serde::Serialize;
use std::time::Instant;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub checks: ReadyChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadyChecks {
    pub session_codec: CheckResult,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    pub signed: bool,
    pub latency_us: u64,
}

/// GET /health - Liveness probe (fast, no dependencies)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "session-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /ready - Readiness probe (round-trips a probe session through the codec)
pub async fn ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, StatusCode> {
    let start = Instant::now();

    let session = state.session.session_for(&HeaderMap::new());
    let codec = session.store().codec();
    let probe = Principal::new("readiness-probe", "probe@localhost", RoleTag::Consumer);
    let round_trip = codec
        .encode(&SessionPayload::new(&probe, None))
        .and_then(|stored| codec.decode(&stored));
    let latency_us = start.elapsed().as_micros() as u64;

    let check = CheckResult {
        status: if round_trip.is_ok() { "ok" } else { "error" },
        signed: codec.is_signed(),
        latency_us,
    };

    if round_trip.is_ok() {
        Ok(Json(ReadyResponse {
            status: "ready",
            service: "session-api",
            checks: ReadyChecks {
                session_codec: check,
            },
        }))
    } else {
        tracing::error!(?check, "Session codec self-check failed");
        // Return 503 if any check fails
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
