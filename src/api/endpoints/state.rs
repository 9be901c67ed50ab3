//! Current progress, on demand.

use axum::extract::State;
use axum::Json;

use crate::api::types::ApiContext;
use crate::broadcast::{build_payload, ProgressPayload};

/// `GET /api/state`: same payload the broadcast loop pushes.
pub async fn current(State(ctx): State<ApiContext>) -> Json<ProgressPayload> {
    Json(build_payload(&ctx.core.patient().snapshot()))
}
