//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub connected_clients: usize,
    pub classifier_configured: bool,
}

/// `GET /api/health`: liveness plus a few counters.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        connected_clients: ctx.core.hub().len(),
        classifier_configured: ctx.core.classifier().is_configured(),
    })
}
