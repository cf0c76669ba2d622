//! Guarded portal sections
//!
//! Rendering lives in the frontend; these handlers only answer once the
//! access layer has let a request through.

use axum::http::Uri;
use axum::Json;
use portal_axum::RequirePrincipal;
use portal_types::Principal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub section: &'static str,
    pub path: String,
    pub user: Principal,
}

/// GET /consumer/*
pub async fn consumer(uri: Uri, RequirePrincipal(user): RequirePrincipal) -> Json<SectionResponse> {
    section("consumer", &uri, user)
}

/// GET /workspace/*
pub async fn workspace(uri: Uri, RequirePrincipal(user): RequirePrincipal) -> Json<SectionResponse> {
    section("workspace", &uri, user)
}

fn section(section: &'static str, uri: &Uri, user: Principal) -> Json<SectionResponse> {
    Json(SectionResponse {
        section,
        path: uri.path().to_string(),
        user,
    })
}
